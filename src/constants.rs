//! # System Constants
//!
//! Defaults and environment variable names that define the operational
//! boundaries of the production engine.

use std::time::Duration;

/// Engine defaults applied when settings omit a value
pub mod defaults {
    /// Completed shots between periodic checkpoints
    pub const CHECKPOINT_INTERVAL: usize = 10;
    pub const CHECKPOINT_DIRECTORY: &str = "checkpoints";
    pub const OUTPUT_DIRECTORY: &str = "output";
    pub const MAX_WORKERS: usize = 4;
    /// Fixed per-phase cost used by remaining-time estimates
    pub const PHASE_OVERHEAD_SECONDS: f64 = 5.0;
    /// Upper bound accepted for the per-phase cost (one day)
    pub const MAX_PHASE_OVERHEAD_SECONDS: f64 = 86_400.0;
}

/// Environment variables read by the engine
pub mod env {
    /// Deployment environment (`development`, `test`, `production`)
    pub const ENVIRONMENT: &str = "SHOTLINE_ENV";
    pub const ENVIRONMENT_FALLBACK: &str = "APP_ENV";
    /// `json` switches console logging to JSON lines
    pub const LOG_FORMAT: &str = "SHOTLINE_LOG_FORMAT";
    /// Prefix for layered settings overrides, e.g. `SHOTLINE__PARALLEL__MAX_WORKERS=8`
    pub const SETTINGS_PREFIX: &str = "SHOTLINE";
    pub const SETTINGS_SEPARATOR: &str = "__";
}

/// File naming used by persisted artifacts
pub mod files {
    pub const CHECKPOINT_SUFFIX: &str = ".checkpoint.json";
    pub const MANIFEST_NAME: &str = "manifest.json";
}

/// Version tag written into every checkpoint record
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Convert a fractional second count into a `Duration`, clamping negatives
/// and NaN to zero and values past the representable range to `Duration::MAX`
pub fn seconds(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
    }
}
