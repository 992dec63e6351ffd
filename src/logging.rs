//! # Structured Logging Module
//!
//! Environment-aware structured logging for production runs. Console output
//! is human-readable by default and switches to JSON lines when
//! `SHOTLINE_LOG_FORMAT=json`.

use crate::constants::env;
use crate::state_machine::ExecutionPhase;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));
        let json = wants_json(std::env::var(env::LOG_FORMAT).ok().as_deref());

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_filter(filter)
                .boxed()
        };

        // Another component may already own the global subscriber
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = json,
            "Structured logging initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env::ENVIRONMENT)
        .or_else(|_| std::env::var(env::ENVIRONMENT_FALLBACK))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn wants_json(format: Option<&str>) -> bool {
    format.is_some_and(|value| value.eq_ignore_ascii_case("json"))
}

/// Log structured data for phase transitions
pub fn log_phase_operation(
    operation: &str,
    production_id: &str,
    phase: ExecutionPhase,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        production_id = %production_id,
        phase = %phase,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "PHASE_OPERATION"
    );
}

/// Log structured data for shot dispatches
pub fn log_shot_operation(
    operation: &str,
    production_id: &str,
    shot_index: usize,
    shot_name: &str,
    status: &str,
    duration_ms: Option<u64>,
) {
    tracing::info!(
        operation = %operation,
        production_id = %production_id,
        shot_index = shot_index,
        shot_name = %shot_name,
        status = %status,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "SHOT_OPERATION"
    );
}

/// Log structured data for checkpoint persistence
pub fn log_checkpoint_operation(
    operation: &str,
    production_id: &str,
    location: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        production_id = %production_id,
        location = %location,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "CHECKPOINT_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "ERROR"
    );
}
