use super::states::RunStatus;
use thiserror::Error;

/// Errors raised by the run state machine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateMachineError {
    #[error("Invalid run transition from {from} on event {event}")]
    InvalidTransition { from: RunStatus, event: String },

    #[error("Execution state is immutable in terminal status {status}")]
    Immutable { status: RunStatus },
}

/// Result type alias for state machine operations
pub type StateMachineResult<T> = Result<T, StateMachineError>;
