use crate::state_machine::ExecutionState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// How a single shot dispatch ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ShotOutcome {
    /// Renderer reported success
    Rendered,
    /// Renderer ran and reported failure
    Rejected,
    /// Renderer raised an error or the worker died
    Errored(String),
}

impl ShotOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered)
    }

    /// Message to append to the run's error list, if any
    pub fn error_message(&self, shot_name: &str) -> Option<String> {
        match self {
            Self::Rendered => None,
            Self::Rejected => Some(format!("Shot {shot_name} failed to render")),
            Self::Errored(reason) => Some(format!("Shot {shot_name} raised an error: {reason}")),
        }
    }
}

/// Result of one shot dispatch, produced by a worker and applied by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotReport {
    pub index: usize,
    pub outcome: ShotOutcome,
    pub elapsed: Duration,
}

impl ShotReport {
    pub fn new(index: usize, outcome: ShotOutcome, elapsed: Duration) -> Self {
        Self {
            index,
            outcome,
            elapsed,
        }
    }
}

/// Final, immutable summary of a production run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionResult {
    pub run_id: Uuid,
    /// The single gate callers should check
    pub success: bool,
    pub shots_completed: usize,
    pub shots_failed: usize,
    pub total_time: Duration,
    pub output_paths: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub final_state: ExecutionState,
}

impl ProductionResult {
    pub fn production_id(&self) -> &str {
        &self.final_state.production_id
    }
}
