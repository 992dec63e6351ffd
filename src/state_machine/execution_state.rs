//! # Execution State
//!
//! The mutable record of one production run: which phase it is in, which shots
//! have rendered or failed, and the lifecycle status.
//!
//! The record is owned by a single `ExecutionEngine` and only mutated from the
//! task driving `execute()`. Copies are persisted through a `CheckpointStore`.
//! Once the status reaches a terminal value the record rejects further
//! mutation; the only way back out of `Failed` is [`RunEvent::Resume`], used by
//! resume-from-checkpoint.

use super::errors::{StateMachineError, StateMachineResult};
use super::events::RunEvent;
use super::states::{ExecutionPhase, RunStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionState {
    pub production_id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub current_phase: ExecutionPhase,
    /// Next shot index the SHOTS phase would dispatch
    pub current_shot: usize,
    pub completed_shots: BTreeSet<usize>,
    pub failed_shots: BTreeSet<usize>,
    pub checkpoint_path: Option<PathBuf>,
    pub status: RunStatus,
    /// Percentage in `0.0..=100.0`
    pub progress: f64,
    pub error_message: Option<String>,
}

impl ExecutionState {
    pub fn new(production_id: impl Into<String>) -> Self {
        Self {
            production_id: production_id.into(),
            started_at: None,
            updated_at: Utc::now(),
            current_phase: ExecutionPhase::default(),
            current_shot: 0,
            completed_shots: BTreeSet::new(),
            failed_shots: BTreeSet::new(),
            checkpoint_path: None,
            status: RunStatus::default(),
            progress: 0.0,
            error_message: None,
        }
    }

    /// Apply a lifecycle event, returning the new status
    pub fn transition(&mut self, event: RunEvent) -> StateMachineResult<RunStatus> {
        let target = Self::determine_target_status(self.status, &event)?;

        match &event {
            RunEvent::Start => {
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                }
            }
            RunEvent::Resume => self.error_message = None,
            RunEvent::Complete => self.progress = 100.0,
            RunEvent::Fail(message) => self.error_message = Some(message.clone()),
            RunEvent::Pause | RunEvent::Cancel => {}
        }

        self.status = target;
        self.touch();
        Ok(target)
    }

    fn determine_target_status(
        current: RunStatus,
        event: &RunEvent,
    ) -> StateMachineResult<RunStatus> {
        let target = match (current, event) {
            (RunStatus::Pending, RunEvent::Start) => RunStatus::Running,

            (RunStatus::Running, RunEvent::Pause) => RunStatus::Paused,
            (RunStatus::Paused, RunEvent::Resume) => RunStatus::Running,
            (RunStatus::Failed, RunEvent::Resume) => RunStatus::Running,

            (RunStatus::Running, RunEvent::Complete) => RunStatus::Completed,

            (RunStatus::Pending, RunEvent::Fail(_)) => RunStatus::Failed,
            (RunStatus::Running, RunEvent::Fail(_)) => RunStatus::Failed,
            (RunStatus::Paused, RunEvent::Fail(_)) => RunStatus::Failed,

            (RunStatus::Pending, RunEvent::Cancel) => RunStatus::Cancelled,
            (RunStatus::Running, RunEvent::Cancel) => RunStatus::Cancelled,
            (RunStatus::Paused, RunEvent::Cancel) => RunStatus::Cancelled,

            (from, event) => {
                return Err(StateMachineError::InvalidTransition {
                    from,
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }

    /// Move to the next phase of the fixed ordering; a no-op on the last phase
    pub fn advance_phase(&mut self) -> StateMachineResult<ExecutionPhase> {
        self.ensure_mutable()?;
        if let Some(next) = self.current_phase.next() {
            self.current_phase = next;
        }
        self.touch();
        Ok(self.current_phase)
    }

    /// Record a rendered shot; clears any earlier failure of the same index
    pub fn complete_shot(&mut self, index: usize) -> StateMachineResult<()> {
        self.ensure_mutable()?;
        self.failed_shots.remove(&index);
        self.completed_shots.insert(index);
        self.touch();
        Ok(())
    }

    /// Record a failed shot; clears any earlier completion of the same index
    pub fn fail_shot(&mut self, index: usize) -> StateMachineResult<()> {
        self.ensure_mutable()?;
        self.completed_shots.remove(&index);
        self.failed_shots.insert(index);
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record progress. While running, progress never decreases.
    pub fn record_progress(&mut self, value: f64) -> StateMachineResult<()> {
        self.ensure_mutable()?;
        let value = value.clamp(0.0, 100.0);
        self.progress = if self.status.is_active() {
            self.progress.max(value)
        } else {
            value
        };
        self.touch();
        Ok(())
    }

    /// Index the SHOTS phase starts from: `current_shot` when set, otherwise
    /// one past the highest completed shot
    pub fn resume_start_index(&self) -> usize {
        if self.current_shot != 0 {
            return self.current_shot;
        }
        self.completed_shots
            .iter()
            .next_back()
            .map(|highest| highest + 1)
            .unwrap_or(0)
    }

    pub fn is_shot_completed(&self, index: usize) -> bool {
        self.completed_shots.contains(&index)
    }

    pub fn processed_shot_count(&self) -> usize {
        self.completed_shots.len() + self.failed_shots.len()
    }

    fn ensure_mutable(&self) -> StateMachineResult<()> {
        if self.status.is_terminal() {
            return Err(StateMachineError::Immutable {
                status: self.status,
            });
        }
        Ok(())
    }
}
