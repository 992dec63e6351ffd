//! # Phase Plan and Stage Hooks
//!
//! The engine walks an immutable [`PhasePlan`] and selects the handler for
//! each phase by matching on [`ExecutionPhase`]. Its own handlers only do
//! cheap, idempotent checks, so a resumed run can re-enter them. Host-bound
//! work (scene preparation, asset builds, post-processing, encoding) belongs
//! to a [`StageHooks`] implementation supplied by the embedding application.
//!
//! Hook failures fail the run. Effects of phases that already finished are not
//! rolled back.

use super::control::ControlRequest;
use crate::models::ProductionConfig;
use crate::state_machine::{ExecutionPhase, ExecutionState};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Fixed ordering of the phases a run goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePlan {
    phases: &'static [ExecutionPhase],
}

impl PhasePlan {
    pub const fn standard() -> Self {
        Self {
            phases: &ExecutionPhase::ALL,
        }
    }

    pub fn phases(&self) -> &'static [ExecutionPhase] {
        self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phases from `phase` (inclusive) to the end of the plan
    pub fn remaining_from(&self, phase: ExecutionPhase) -> usize {
        self.phases
            .iter()
            .position(|candidate| *candidate == phase)
            .map(|position| self.phases.len() - position)
            .unwrap_or(0)
    }

    /// Overall progress for `fraction` of `phase` done, as a percentage
    pub fn progress_at(&self, phase: ExecutionPhase, fraction: f64) -> f64 {
        if self.phases.is_empty() {
            return 100.0;
        }
        let position = self
            .phases
            .iter()
            .position(|candidate| *candidate == phase)
            .unwrap_or(0);
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        100.0 * (position as f64 + fraction) / self.phases.len() as f64
    }
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// Result of a phase handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseOutcome {
    Continue,
    /// Stop the run as failed
    Halt(String),
    /// A pause or cancel request was observed
    Interrupted(ControlRequest),
}

/// Read-only view handed to stage hooks
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a ProductionConfig,
    pub state: &'a ExecutionState,
    /// `<output_directory>/<production_id>`
    pub output_root: &'a Path,
}

/// Host-side work attached to the non-shot phases. Every method defaults to a
/// no-op.
#[async_trait]
pub trait StageHooks: Send + Sync {
    async fn prepare(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn build_characters(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn build_locations(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn post_process(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn export(&self, _ctx: &StageContext<'_>, _outputs: &[PathBuf]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn finalize(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStageHooks;

impl StageHooks for NoopStageHooks {}
