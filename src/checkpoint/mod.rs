//! # Checkpoint Persistence
//!
//! Durable snapshots of an [`ExecutionState`], one record per production id.
//! A checkpoint is what lets a paused or failed production pick up where it
//! stopped. Loading a record yields a state equal to the one saved, field for
//! field, including the completed and failed shot sets.
//!
//! Persistence failures are surfaced as [`CheckpointError`]; they are never
//! folded into a boolean.

pub mod file_store;
pub mod memory_store;

use crate::constants::CHECKPOINT_FORMAT_VERSION;
use crate::state_machine::ExecutionState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

pub use file_store::FileCheckpointStore;
pub use memory_store::MemoryCheckpointStore;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checkpoint serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checkpoint record at {location} is invalid: {reason}")]
    InvalidRecord { location: String, reason: String },
}

impl CheckpointError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// The persisted form of a checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub version: u32,
    pub run_id: Uuid,
    /// Path or id of the production description the run was started from
    pub config_reference: String,
    pub timestamp: DateTime<Utc>,
    pub state: ExecutionState,
}

impl CheckpointRecord {
    pub fn new(state: ExecutionState, config_reference: impl Into<String>, run_id: Uuid) -> Self {
        Self {
            version: CHECKPOINT_FORMAT_VERSION,
            run_id,
            config_reference: config_reference.into(),
            timestamp: Utc::now(),
            state,
        }
    }

    pub fn production_id(&self) -> &str {
        &self.state.production_id
    }

    /// Structural checks applied to every record read back from storage
    pub fn verify(&self, expected_production_id: &str, location: &str) -> CheckpointResult<()> {
        if self.version != CHECKPOINT_FORMAT_VERSION {
            return Err(CheckpointError::invalid(
                location,
                format!(
                    "unsupported format version {} (expected {CHECKPOINT_FORMAT_VERSION})",
                    self.version
                ),
            ));
        }

        if self.state.production_id != expected_production_id {
            return Err(CheckpointError::invalid(
                location,
                format!(
                    "record is for production '{}', not '{expected_production_id}'",
                    self.state.production_id
                ),
            ));
        }

        if let Some(index) = self
            .state
            .completed_shots
            .intersection(&self.state.failed_shots)
            .next()
        {
            return Err(CheckpointError::invalid(
                location,
                format!("shot {index} is recorded as both completed and failed"),
            ));
        }

        Ok(())
    }
}

/// Keyed storage for checkpoint records
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Where the record for `production_id` lives; stable across saves
    fn location(&self, production_id: &str) -> PathBuf;

    /// Persist a record, replacing any earlier record for the same production
    async fn save(&self, record: &CheckpointRecord) -> CheckpointResult<PathBuf>;

    /// Read the record for `production_id`, `None` when none was saved
    async fn load(&self, production_id: &str) -> CheckpointResult<Option<CheckpointRecord>>;

    /// Delete the record for `production_id`, returning whether one existed
    async fn remove(&self, production_id: &str) -> CheckpointResult<bool>;

    /// Production ids with a stored record
    async fn list(&self) -> CheckpointResult<Vec<String>>;
}
