// State machine module for production runs
//
// Run lifecycle statuses, the fixed phase ordering, lifecycle events and the
// execution state record that an engine mutates while driving a production.

pub mod errors;
pub mod events;
pub mod execution_state;
pub mod states;

// Re-export main types for convenient access
pub use errors::{StateMachineError, StateMachineResult};
pub use events::RunEvent;
pub use execution_state::ExecutionState;
pub use states::{ExecutionPhase, RunStatus};
