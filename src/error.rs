//! Error types for the production engine.
//!
//! Infrastructure failures (checkpoint I/O, configuration) stay distinct from
//! run failures (validation, phase handlers). Failures of a single shot are not
//! errors at this level: they are recorded on the execution state and in the
//! production result.

use crate::checkpoint::CheckpointError;
use crate::config::ConfigurationError;
use crate::state_machine::{ExecutionPhase, RunStatus, StateMachineError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Production validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Phase {phase} failed: {reason}")]
    PhaseFailed {
        phase: ExecutionPhase,
        reason: String,
    },

    #[error("Shot index {index} is outside the production ({shot_count} shots)")]
    ShotOutOfRange { index: usize, shot_count: usize },

    #[error("State machine error: {0}")]
    StateMachine(#[from] StateMachineError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Resume error: {0}")]
    Resume(#[from] ResumeError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl EngineError {
    pub fn phase_failed(phase: ExecutionPhase, reason: impl Into<String>) -> Self {
        Self::PhaseFailed {
            phase,
            reason: reason.into(),
        }
    }

    /// True for failures of persistence infrastructure rather than of the run itself
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Checkpoint(_))
    }
}

/// Reasons a checkpoint cannot be resumed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResumeError {
    #[error("Production {production_id} cannot be resumed from status {status}")]
    NotResumable {
        production_id: String,
        status: RunStatus,
    },

    #[error("No checkpoint found for production {production_id}")]
    CheckpointMissing { production_id: String },

    #[error("Checkpoint belongs to production {found}, configuration describes {expected}")]
    ProductionMismatch { expected: String, found: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
