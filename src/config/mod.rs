//! # Engine Configuration
//!
//! Typed settings for the production engine: checkpoint cadence and location,
//! worker pool width and backend, output location and estimate tuning.
//!
//! Settings come from a YAML file layered with `SHOTLINE__*` environment
//! overrides (see [`ConfigManager`]). Every field has a default so an empty
//! file, or no file at all, yields a usable configuration.
//!
//! ```yaml
//! checkpoint:
//!   directory: checkpoints
//!   interval: 10
//! parallel:
//!   enabled: true
//!   max_workers: 4
//!   backend: thread
//! output_directory: output
//! phase_overhead_seconds: 5.0
//! ```

pub mod error;
pub mod loader;

use crate::constants::{self, defaults};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub checkpoint: CheckpointConfig,
    pub parallel: ParallelConfig,
    /// Root directory for per-production outputs
    pub output_directory: PathBuf,
    /// Fixed per-phase cost used by `estimate_remaining_time`
    pub phase_overhead_seconds: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            checkpoint: CheckpointConfig::default(),
            parallel: ParallelConfig::default(),
            output_directory: PathBuf::from(defaults::OUTPUT_DIRECTORY),
            phase_overhead_seconds: defaults::PHASE_OVERHEAD_SECONDS,
        }
    }
}

impl EngineConfig {
    /// Validate value ranges and cross-field requirements
    pub fn validate(&self) -> ConfigResult<()> {
        if self.checkpoint.interval == 0 {
            return Err(ConfigurationError::invalid_value(
                "checkpoint.interval",
                "0",
                "checkpoint interval must be at least 1 completed shot",
            ));
        }

        if self.parallel.max_workers == 0 {
            return Err(ConfigurationError::invalid_value(
                "parallel.max_workers",
                "0",
                "worker pool needs at least one worker",
            ));
        }

        if !(0.0..=defaults::MAX_PHASE_OVERHEAD_SECONDS).contains(&self.phase_overhead_seconds) {
            return Err(ConfigurationError::invalid_value(
                "phase_overhead_seconds",
                self.phase_overhead_seconds.to_string(),
                format!(
                    "must be between 0 and {} seconds",
                    defaults::MAX_PHASE_OVERHEAD_SECONDS
                ),
            ));
        }

        if self.parallel.backend == ExecutorBackend::Process {
            let program_missing = self
                .parallel
                .process
                .as_ref()
                .map(|process| process.program.as_os_str().is_empty())
                .unwrap_or(true);
            if program_missing {
                return Err(ConfigurationError::missing_required_field(
                    "parallel.process.program",
                    "process backend",
                ));
            }
        }

        Ok(())
    }

    pub fn phase_overhead(&self) -> Duration {
        constants::seconds(self.phase_overhead_seconds)
    }
}

/// Checkpoint persistence settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    pub directory: PathBuf,
    /// Completed shots between periodic checkpoints
    pub interval: usize,
    /// Also checkpoint after every phase advance
    pub on_phase_boundary: bool,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(defaults::CHECKPOINT_DIRECTORY),
            interval: defaults::CHECKPOINT_INTERVAL,
            on_phase_boundary: true,
        }
    }
}

/// Shot worker pool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Dispatch shots through dependency groups; when false shots run one at a time
    pub enabled: bool,
    pub max_workers: usize,
    pub backend: ExecutorBackend,
    /// Required when `backend` is `process`
    pub process: Option<ProcessBackendConfig>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_workers: defaults::MAX_WORKERS,
            backend: ExecutorBackend::default(),
            process: None,
        }
    }
}

impl ParallelConfig {
    /// True when shots should go through the grouped worker pool
    pub fn runs_grouped(&self) -> bool {
        self.enabled && self.max_workers > 1
    }
}

/// Where shot renders execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorBackend {
    /// In-process renderer on the blocking thread pool
    #[default]
    Thread,
    /// One external renderer process per shot
    Process,
}

/// External renderer command for the process backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessBackendConfig {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}
