use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use proptest::strategy::Just;
use shotline_core::models::ShotConfig;
use shotline_core::state_machine::{ExecutionPhase, ExecutionState, RunStatus};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Strategy for primary/secondary character names, empty meaning none
pub fn character_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("hero".to_string()),
        Just("villain".to_string()),
        Just("mentor".to_string()),
        Just("rival".to_string()),
        Just("narrator".to_string()),
    ]
}

/// Strategy for a single shot with a small scene range so runs of equal scenes occur
pub fn shot_strategy() -> impl Strategy<Value = ShotConfig> {
    (
        "[a-z]{3,10}",
        1u32..4,
        character_strategy(),
        prop::option::of(character_strategy()),
        1u32..200,
    )
        .prop_map(|(name, scene, character, character2, start)| {
            let mut shot = ShotConfig::new(name, scene)
                .with_character(character)
                .with_frames(start, start + 47);
            shot.character2 = character2.filter(|name| !name.is_empty());
            shot
        })
}

/// Strategy for shot lists, including the empty list
pub fn shot_list_strategy() -> impl Strategy<Value = Vec<ShotConfig>> {
    prop::collection::vec(shot_strategy(), 0..40)
}

/// Strategy for non-empty shot lists
pub fn non_empty_shot_list_strategy() -> impl Strategy<Value = Vec<ShotConfig>> {
    prop::collection::vec(shot_strategy(), 1..40)
}

pub fn phase_strategy() -> impl Strategy<Value = ExecutionPhase> {
    prop::sample::select(ExecutionPhase::ALL.to_vec())
}

pub fn status_strategy() -> impl Strategy<Value = RunStatus> {
    prop_oneof![
        Just(RunStatus::Pending),
        Just(RunStatus::Running),
        Just(RunStatus::Paused),
        Just(RunStatus::Completed),
        Just(RunStatus::Failed),
        Just(RunStatus::Cancelled),
    ]
}

/// Strategy for arbitrary, internally consistent execution states
pub fn execution_state_strategy() -> impl Strategy<Value = ExecutionState> {
    (
        "[a-z][a-z0-9-]{0,20}",
        phase_strategy(),
        status_strategy(),
        0usize..64,
        prop::collection::btree_set(0usize..64, 0..24),
        prop::collection::btree_set(0usize..64, 0..24),
        0.0f64..=100.0,
        prop::option::of("[a-zA-Z ]{1,40}"),
        0i64..2_000_000_000,
        0u32..1_000_000_000,
        any::<bool>(),
    )
        .prop_map(
            |(
                production_id,
                phase,
                status,
                current_shot,
                completed,
                failed,
                progress,
                error_message,
                seconds,
                nanos,
                has_checkpoint,
            )| {
                let failed: BTreeSet<usize> = failed.difference(&completed).copied().collect();
                let updated_at = Utc
                    .timestamp_opt(seconds, nanos)
                    .single()
                    .unwrap_or_else(Utc::now);
                let checkpoint_path = has_checkpoint
                    .then(|| PathBuf::from(format!("checkpoints/{production_id}.checkpoint.json")));

                ExecutionState {
                    production_id,
                    started_at: Some(updated_at),
                    updated_at,
                    current_phase: phase,
                    current_shot,
                    completed_shots: completed,
                    failed_shots: failed,
                    checkpoint_path,
                    status,
                    progress,
                    error_message,
                }
            },
        )
}

#[derive(Debug, Clone, Copy)]
pub enum ShotMutation {
    Complete(usize),
    Fail(usize),
}

/// Strategy for sequences of shot completions and failures over a small index space
pub fn shot_mutations_strategy() -> impl Strategy<Value = Vec<ShotMutation>> {
    prop::collection::vec(
        prop_oneof![
            (0usize..12).prop_map(ShotMutation::Complete),
            (0usize..12).prop_map(ShotMutation::Fail),
        ],
        0..60,
    )
}
