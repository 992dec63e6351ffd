//! # Execution Engine
//!
//! Drives one production through the phase plan:
//! `validate → prepare → characters → locations → shots → post_process → export → finalize`.
//!
//! ## Ownership
//!
//! The engine owns its [`ExecutionState`] and is the only writer. Shot
//! workers return [`ShotReport`]s which the engine applies after each group
//! barrier, so the state needs no lock.
//!
//! ## Failure Semantics
//!
//! - A failed shot is recorded in `failed_shots` and in the result's errors.
//!   Sibling shots and the SHOTS phase carry on.
//! - A failed phase marks the run FAILED and no later phase starts. Side
//!   effects of earlier phases (directories, hook work) are left in place;
//!   nothing is rolled back.
//! - A checkpoint that cannot be written fails the run. If the end-of-run
//!   checkpoint cannot be written, `execute()` returns the checkpoint error.
//!
//! ## Resume
//!
//! [`ExecutionEngine::resume_production`] restores a PAUSED or FAILED
//! checkpoint and calls `execute()` again. Every phase handler is re-entered
//! from VALIDATE. Handlers before `current_phase` only re-check and do not
//! move the phase; the SHOTS handler skips shots already completed.

use super::control::{ControlRequest, ExecutionControl};
use super::dispatch::{dispatcher_for, ShotDispatcher, ShotRenderer};
use super::parallel_executor::ParallelExecutor;
use super::phases::{NoopStageHooks, PhaseOutcome, PhasePlan, StageContext, StageHooks};
use crate::checkpoint::{CheckpointRecord, CheckpointStore, FileCheckpointStore};
use crate::config::EngineConfig;
use crate::constants::files::MANIFEST_NAME;
use crate::error::{EngineError, EngineResult, ResumeError};
use crate::logging::{log_checkpoint_operation, log_error, log_phase_operation, log_shot_operation};
use crate::models::{ProductionConfig, ProductionResult, ShotReport};
use crate::state_machine::{ExecutionPhase, ExecutionState, RunEvent, RunStatus};
use crate::validation::{ProductionValidator, StructuralValidator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct ExecutionEngine {
    config: Arc<ProductionConfig>,
    settings: EngineConfig,
    plan: PhasePlan,
    state: ExecutionState,
    executor: ParallelExecutor,
    dispatcher: Arc<dyn ShotDispatcher>,
    validator: Arc<dyn ProductionValidator>,
    checkpoints: Arc<dyn CheckpointStore>,
    hooks: Arc<dyn StageHooks>,
    control: ExecutionControl,
    run_id: Uuid,
    errors: Vec<String>,
    warnings: Vec<String>,
    output_paths: Vec<PathBuf>,
    /// Render time of every completed shot, for remaining-time estimates
    shot_durations: Vec<Duration>,
    completions_since_checkpoint: usize,
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("production_id", &self.state.production_id)
            .field("run_id", &self.run_id)
            .field("status", &self.state.status)
            .field("current_phase", &self.state.current_phase)
            .field("backend", &self.dispatcher.backend())
            .finish_non_exhaustive()
    }
}

impl ExecutionEngine {
    /// Create an engine with the structural validator, a file checkpoint store
    /// under `settings.checkpoint.directory`, and no stage hooks
    pub fn new(
        config: ProductionConfig,
        settings: EngineConfig,
        renderer: Arc<dyn ShotRenderer>,
    ) -> EngineResult<Self> {
        settings.validate()?;
        let dispatcher = dispatcher_for(&settings.parallel, renderer)?;
        let checkpoints: Arc<dyn CheckpointStore> =
            Arc::new(FileCheckpointStore::new(settings.checkpoint.directory.clone()));

        let mut state = ExecutionState::new(config.production_id());
        state.checkpoint_path = Some(checkpoints.location(config.production_id()));

        Ok(Self {
            config: Arc::new(config),
            executor: ParallelExecutor::new(settings.parallel.clone()),
            settings,
            plan: PhasePlan::standard(),
            state,
            dispatcher,
            validator: Arc::new(StructuralValidator),
            checkpoints,
            hooks: Arc::new(NoopStageHooks),
            control: ExecutionControl::new(),
            run_id: Uuid::new_v4(),
            errors: Vec::new(),
            warnings: Vec::new(),
            output_paths: Vec::new(),
            shot_durations: Vec::new(),
            completions_since_checkpoint: 0,
        })
    }

    /// Replace the shot dispatch strategy
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ShotDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ProductionValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_checkpoint_store(mut self, checkpoints: Arc<dyn CheckpointStore>) -> Self {
        self.state.checkpoint_path = Some(checkpoints.location(&self.state.production_id));
        self.checkpoints = checkpoints;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn StageHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_plan(mut self, plan: PhasePlan) -> Self {
        self.plan = plan;
        self
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn config(&self) -> &ProductionConfig {
        &self.config
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    /// Handle for requesting pause or cancel from another task
    pub fn control(&self) -> ExecutionControl {
        self.control.clone()
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// `<output_directory>/<production_id>`
    pub fn output_root(&self) -> PathBuf {
        self.settings
            .output_directory
            .join(&self.state.production_id)
    }

    /// Run every phase in order and summarize the outcome.
    ///
    /// Returns `Err` only for failures outside the run itself: an invalid
    /// lifecycle state on entry, or a final checkpoint that could not be saved.
    #[instrument(skip(self), fields(production_id = %self.state.production_id))]
    pub async fn execute(&mut self) -> EngineResult<ProductionResult> {
        let started = Instant::now();

        if self.state.status != RunStatus::Running {
            self.state.transition(RunEvent::Start)?;
        }
        self.reset_run_record();

        info!(
            run_id = %self.run_id,
            current_phase = %self.state.current_phase,
            shots = self.config.shot_count(),
            completed = self.state.completed_shots.len(),
            backend = ?self.dispatcher.backend(),
            "Starting production run"
        );

        for &phase in self.plan.phases() {
            let replay = phase.index() < self.state.current_phase.index();
            log_phase_operation(
                "enter",
                &self.state.production_id,
                phase,
                if replay { "replay" } else { "running" },
                None,
            );

            let step = match self.run_phase(phase).await {
                Ok(PhaseOutcome::Continue) if replay => Ok(PhaseOutcome::Continue),
                Ok(PhaseOutcome::Continue) => self
                    .finish_phase(phase)
                    .await
                    .map(|()| PhaseOutcome::Continue),
                other => other,
            };

            match step {
                Ok(PhaseOutcome::Continue) => {}
                Ok(PhaseOutcome::Halt(reason)) => {
                    self.fail_run(phase, reason)?;
                    break;
                }
                Ok(PhaseOutcome::Interrupted(request)) => {
                    self.interrupt_run(phase, request)?;
                    break;
                }
                Err(EngineError::PhaseFailed { reason, .. }) => {
                    self.fail_run(phase, reason)?;
                    break;
                }
                Err(error) => {
                    self.fail_run(phase, error.to_string())?;
                    break;
                }
            }
        }

        if self.state.status == RunStatus::Running {
            self.state.transition(RunEvent::Complete)?;
            info!(
                completed = self.state.completed_shots.len(),
                failed = self.state.failed_shots.len(),
                "Production completed"
            );
        }

        // Always persisted, whatever the outcome
        let saved = self.save_checkpoint().await;
        let result = self.build_result(started.elapsed());
        saved?;
        Ok(result)
    }

    /// Render one shot through the dispatcher and record the outcome.
    ///
    /// A renderer failure is not an error here: it lands in `failed_shots`.
    pub async fn execute_shot(&mut self, index: usize) -> EngineResult<ShotReport> {
        let shot = self
            .config
            .shots
            .get(index)
            .cloned()
            .ok_or(EngineError::ShotOutOfRange {
                index,
                shot_count: self.config.shot_count(),
            })?;

        let started = Instant::now();
        let outcome = self.dispatcher.dispatch(index, shot).await;
        let report = ShotReport::new(index, outcome, started.elapsed());
        self.apply_report(&report)?;
        Ok(report)
    }

    /// Persist the current state under the production id
    pub async fn save_checkpoint(&self) -> EngineResult<PathBuf> {
        let record = CheckpointRecord::new(
            self.state.clone(),
            self.config.config_reference(),
            self.run_id,
        );

        match self.checkpoints.save(&record).await {
            Ok(path) => {
                log_checkpoint_operation(
                    "save",
                    &self.state.production_id,
                    &path.display().to_string(),
                    "ok",
                    Some(&format!(
                        "phase={} completed={} failed={}",
                        self.state.current_phase,
                        self.state.completed_shots.len(),
                        self.state.failed_shots.len()
                    )),
                );
                Ok(path)
            }
            Err(error) => {
                log_error(
                    "checkpoint",
                    "save",
                    &error.to_string(),
                    Some(&self.state.production_id),
                );
                Err(error.into())
            }
        }
    }

    /// Read back the state saved for `production_id`
    pub async fn load_checkpoint(&self, production_id: &str) -> EngineResult<ExecutionState> {
        let record = self
            .checkpoints
            .load(production_id)
            .await?
            .ok_or_else(|| ResumeError::CheckpointMissing {
                production_id: production_id.to_string(),
            })?;

        log_checkpoint_operation(
            "load",
            production_id,
            &self.checkpoints.location(production_id).display().to_string(),
            "ok",
            Some(&format!("saved_at={}", record.timestamp.to_rfc3339())),
        );
        Ok(record.state)
    }

    /// Continue a PAUSED or FAILED production from its checkpoint
    #[instrument(skip(self))]
    pub async fn resume_production(&mut self, checkpoint_id: &str) -> EngineResult<ProductionResult> {
        let state = self.load_checkpoint(checkpoint_id).await?;

        if state.production_id != self.config.production_id() {
            return Err(ResumeError::ProductionMismatch {
                expected: self.config.production_id().to_string(),
                found: state.production_id,
            }
            .into());
        }

        if !state.status.is_resumable() {
            return Err(ResumeError::NotResumable {
                production_id: state.production_id,
                status: state.status,
            }
            .into());
        }

        info!(
            status = %state.status,
            current_phase = %state.current_phase,
            current_shot = state.current_shot,
            completed = state.completed_shots.len(),
            failed = state.failed_shots.len(),
            "Resuming production"
        );

        self.state = state;
        self.state.transition(RunEvent::Resume)?;
        self.control.take();
        self.execute().await
    }

    /// Informational estimate of the time left; never used for control flow
    pub fn estimate_remaining_time(&self) -> Duration {
        if self.state.status.is_terminal() {
            return Duration::ZERO;
        }

        let remaining_shots = self
            .config
            .shot_count()
            .saturating_sub(self.state.processed_shot_count());
        let average = match u32::try_from(self.shot_durations.len()) {
            Ok(0) => Duration::ZERO,
            Ok(count) => {
                self.shot_durations
                    .iter()
                    .fold(Duration::ZERO, |total, elapsed| total.saturating_add(*elapsed))
                    / count
            }
            Err(_) => Duration::MAX,
        };
        let remaining_phases = self.plan.remaining_from(self.state.current_phase);

        let shots = average.saturating_mul(u32::try_from(remaining_shots).unwrap_or(u32::MAX));
        let phases = self
            .settings
            .phase_overhead()
            .saturating_mul(u32::try_from(remaining_phases).unwrap_or(u32::MAX));
        shots.saturating_add(phases)
    }

    fn reset_run_record(&mut self) {
        self.run_id = Uuid::new_v4();
        self.errors.clear();
        self.warnings.clear();
        self.output_paths.clear();
        self.completions_since_checkpoint = 0;
    }

    async fn run_phase(&mut self, phase: ExecutionPhase) -> EngineResult<PhaseOutcome> {
        match phase {
            ExecutionPhase::Validate => Ok(self.validate_phase()),
            ExecutionPhase::Prepare => self.prepare_phase().await,
            ExecutionPhase::Characters => self.characters_phase().await,
            ExecutionPhase::Locations => self.locations_phase().await,
            ExecutionPhase::Shots => self.shots_phase().await,
            ExecutionPhase::PostProcess => self.post_process_phase().await,
            ExecutionPhase::Export => self.export_phase().await,
            ExecutionPhase::Finalize => self.finalize_phase().await,
        }
    }

    async fn finish_phase(&mut self, phase: ExecutionPhase) -> EngineResult<()> {
        self.state
            .record_progress(self.plan.progress_at(phase, 1.0))?;
        if !phase.is_last() {
            self.state.advance_phase()?;
        }
        log_phase_operation(
            "complete",
            &self.state.production_id,
            phase,
            "ok",
            Some(&format!("progress={:.1}", self.state.progress)),
        );

        if self.settings.checkpoint.on_phase_boundary && !phase.is_last() {
            self.save_checkpoint().await?;
        }
        Ok(())
    }

    fn fail_run(&mut self, phase: ExecutionPhase, reason: String) -> EngineResult<()> {
        let message = EngineError::phase_failed(phase, reason).to_string();
        log_error(
            "engine",
            &phase.to_string(),
            &message,
            Some(&self.state.production_id),
        );
        self.errors.push(message.clone());
        self.state.transition(RunEvent::fail_with_error(message))?;
        Ok(())
    }

    fn interrupt_run(&mut self, phase: ExecutionPhase, request: ControlRequest) -> EngineResult<()> {
        self.control.take();
        let (event, verb) = match request {
            ControlRequest::Pause => (RunEvent::Pause, "paused"),
            ControlRequest::Cancel => (RunEvent::Cancel, "cancelled"),
        };
        let message = format!(
            "Production {verb} during {phase} before shot {}",
            self.state.current_shot
        );
        warn!(request = %request, current_shot = self.state.current_shot, "{message}");
        self.errors.push(message);
        self.state.transition(event)?;
        Ok(())
    }

    fn stage_error(phase: ExecutionPhase, error: anyhow::Error) -> EngineError {
        EngineError::phase_failed(phase, format!("{error:#}"))
    }

    fn validate_phase(&mut self) -> PhaseOutcome {
        let result = self.validator.validate(&self.config);

        for warning in result.warnings {
            let warning = warning.to_string();
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }

        if result.errors.is_empty() {
            return PhaseOutcome::Continue;
        }

        let error = EngineError::Validation {
            errors: result.errors.iter().map(ToString::to_string).collect(),
        };
        self.errors
            .extend(result.errors.iter().map(ToString::to_string));
        PhaseOutcome::Halt(error.to_string())
    }

    async fn prepare_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let output_root = self.output_root();
        tokio::fs::create_dir_all(&output_root).await.map_err(|e| {
            EngineError::phase_failed(
                ExecutionPhase::Prepare,
                format!("cannot create output directory {}: {e}", output_root.display()),
            )
        })?;

        let ctx = self.stage_context(&output_root);
        self.hooks
            .prepare(&ctx)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::Prepare, e))?;
        Ok(PhaseOutcome::Continue)
    }

    async fn characters_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let referenced: BTreeSet<&str> = self
            .config
            .shots
            .iter()
            .filter(|shot| shot.has_character())
            .map(|shot| shot.character.as_str())
            .chain(self.config.shots.iter().filter_map(|shot| shot.secondary_character()))
            .collect();

        if let Some(missing) = referenced
            .iter()
            .find(|name| !self.config.characters.contains_key(**name))
        {
            return Ok(PhaseOutcome::Halt(format!("character '{missing}' is not defined")));
        }

        let output_root = self.output_root();
        let ctx = self.stage_context(&output_root);
        self.hooks
            .build_characters(&ctx)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::Characters, e))?;
        Ok(PhaseOutcome::Continue)
    }

    async fn locations_phase(&mut self) -> EngineResult<PhaseOutcome> {
        if let Some(missing) = self
            .config
            .shots
            .iter()
            .map(|shot| shot.location.as_str())
            .find(|name| !name.is_empty() && !self.config.locations.contains_key(*name))
        {
            return Ok(PhaseOutcome::Halt(format!("location '{missing}' is not defined")));
        }

        let output_root = self.output_root();
        let ctx = self.stage_context(&output_root);
        self.hooks
            .build_locations(&ctx)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::Locations, e))?;
        Ok(PhaseOutcome::Continue)
    }

    async fn shots_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let start = self.state.resume_start_index();
        debug!(
            start,
            total = self.config.shot_count(),
            grouped = self.settings.parallel.runs_grouped(),
            "Entering shot dispatch"
        );

        let outcome = if self.settings.parallel.runs_grouped() {
            self.run_grouped(start).await?
        } else {
            self.run_sequential(start).await?
        };

        if outcome == PhaseOutcome::Continue {
            self.state
                .record_progress(self.plan.progress_at(ExecutionPhase::Shots, 1.0))?;
        }
        Ok(outcome)
    }

    async fn run_sequential(&mut self, start: usize) -> EngineResult<PhaseOutcome> {
        for index in start..self.config.shot_count() {
            if self.state.is_shot_completed(index) {
                continue;
            }
            if let Some(request) = self.control.requested() {
                return Ok(PhaseOutcome::Interrupted(request));
            }

            self.execute_shot(index).await?;
            self.state.current_shot = index + 1;
            self.checkpoint_if_due().await?;
        }
        Ok(PhaseOutcome::Continue)
    }

    async fn run_grouped(&mut self, start: usize) -> EngineResult<PhaseOutcome> {
        let graph = self.executor.analyze(&self.config.shots);

        for group in graph.iter() {
            let pending: Vec<usize> = group
                .shot_indices
                .iter()
                .copied()
                .filter(|index| *index >= start && !self.state.is_shot_completed(*index))
                .collect();
            let Some(&last) = pending.last() else {
                continue;
            };

            debug!(group_id = group.group_id, pending = pending.len(), "Dispatching group");
            let run = self
                .executor
                .execute_group(
                    &pending,
                    &self.config.shots,
                    Arc::clone(&self.dispatcher),
                    &self.control,
                )
                .await;

            // current_shot still points at this group while its reports are
            // folded in, so a save taken here resumes into the same group
            for report in &run.reports {
                self.apply_report(report)?;
                self.checkpoint_if_due().await?;
            }

            if let Some(request) = run.interrupted {
                self.state.current_shot = run.next_undispatched.unwrap_or(last + 1);
                return Ok(PhaseOutcome::Interrupted(request));
            }

            self.state.current_shot = last + 1;
        }
        Ok(PhaseOutcome::Continue)
    }

    /// Fold a worker's report into the execution state
    fn apply_report(&mut self, report: &ShotReport) -> EngineResult<()> {
        let name = self
            .config
            .shots
            .get(report.index)
            .map(|shot| shot.name.as_str())
            .unwrap_or("<unknown>");
        let elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX);

        match report.outcome.error_message(name) {
            None => {
                self.state.complete_shot(report.index)?;
                self.shot_durations.push(report.elapsed);
                self.completions_since_checkpoint += 1;
                log_shot_operation(
                    "render",
                    &self.state.production_id,
                    report.index,
                    name,
                    "completed",
                    Some(elapsed_ms),
                );
            }
            Some(message) => {
                self.state.fail_shot(report.index)?;
                log_shot_operation(
                    "render",
                    &self.state.production_id,
                    report.index,
                    name,
                    "failed",
                    Some(elapsed_ms),
                );
                warn!(shot_index = report.index, "{message}");
                self.errors.push(message);
            }
        }

        let total = self.config.shot_count().max(1);
        let fraction = self.state.processed_shot_count() as f64 / total as f64;
        self.state
            .record_progress(self.plan.progress_at(ExecutionPhase::Shots, fraction))?;
        Ok(())
    }

    async fn checkpoint_if_due(&mut self) -> EngineResult<()> {
        if self.completions_since_checkpoint >= self.settings.checkpoint.interval {
            self.save_checkpoint().await?;
            self.completions_since_checkpoint = 0;
        }
        Ok(())
    }

    async fn post_process_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let output_root = self.output_root();
        let ctx = self.stage_context(&output_root);
        self.hooks
            .post_process(&ctx)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::PostProcess, e))?;
        Ok(PhaseOutcome::Continue)
    }

    async fn export_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let output_root = self.output_root();
        self.output_paths = self
            .config
            .outputs
            .iter()
            .map(|output| output_root.join(output.file_name()))
            .collect();

        let ctx = self.stage_context(&output_root);
        self.hooks
            .export(&ctx, &self.output_paths)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::Export, e))?;
        Ok(PhaseOutcome::Continue)
    }

    async fn finalize_phase(&mut self) -> EngineResult<PhaseOutcome> {
        let output_root = self.output_root();
        let manifest_path = output_root.join(MANIFEST_NAME);
        let manifest = ProductionManifest::new(&self.config, &self.state, self.run_id, &self.output_paths);
        let payload = serde_json::to_vec_pretty(&manifest).map_err(|e| {
            EngineError::phase_failed(ExecutionPhase::Finalize, format!("cannot encode manifest: {e}"))
        })?;

        let written = async {
            tokio::fs::create_dir_all(&output_root).await?;
            tokio::fs::write(&manifest_path, payload).await
        };
        written.await.map_err(|e| {
            EngineError::phase_failed(
                ExecutionPhase::Finalize,
                format!("cannot write {}: {e}", manifest_path.display()),
            )
        })?;

        let ctx = self.stage_context(&output_root);
        self.hooks
            .finalize(&ctx)
            .await
            .map_err(|e| Self::stage_error(ExecutionPhase::Finalize, e))?;
        Ok(PhaseOutcome::Continue)
    }

    fn stage_context<'a>(&'a self, output_root: &'a Path) -> StageContext<'a> {
        StageContext {
            config: &self.config,
            state: &self.state,
            output_root,
        }
    }

    fn build_result(&self, total_time: Duration) -> ProductionResult {
        ProductionResult {
            run_id: self.run_id,
            success: self.state.status == RunStatus::Completed,
            shots_completed: self.state.completed_shots.len(),
            shots_failed: self.state.failed_shots.len(),
            total_time,
            output_paths: self.output_paths.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            final_state: self.state.clone(),
        }
    }
}

/// Summary written next to the outputs by FINALIZE
#[derive(Debug, Serialize)]
struct ProductionManifest<'a> {
    production_id: &'a str,
    title: Option<&'a str>,
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    shots: Vec<ManifestShot<'a>>,
    outputs: &'a [PathBuf],
}

#[derive(Debug, Serialize)]
struct ManifestShot<'a> {
    index: usize,
    name: &'a str,
    scene: u32,
    status: &'static str,
}

impl<'a> ProductionManifest<'a> {
    fn new(
        config: &'a ProductionConfig,
        state: &'a ExecutionState,
        run_id: Uuid,
        outputs: &'a [PathBuf],
    ) -> Self {
        let shots = config
            .shots
            .iter()
            .enumerate()
            .map(|(index, shot)| ManifestShot {
                index,
                name: &shot.name,
                scene: shot.scene,
                status: if state.completed_shots.contains(&index) {
                    "completed"
                } else if state.failed_shots.contains(&index) {
                    "failed"
                } else {
                    "pending"
                },
            })
            .collect();

        Self {
            production_id: &state.production_id,
            title: config.production.title.as_deref(),
            run_id,
            generated_at: Utc::now(),
            shots,
            outputs,
        }
    }
}
