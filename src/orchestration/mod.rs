//! # Orchestration
//!
//! The production execution core.
//!
//! ## Core Components
//!
//! - **ExecutionEngine**: owns the execution state and walks the phase plan
//! - **DependencyAnalyzer**: partitions shots into ordered, parallel-safe groups
//! - **ParallelExecutor**: bounded worker pool with a barrier between groups
//! - **ShotDispatcher**: thread-pool or process-pool rendering of one shot
//! - **ExecutionControl**: cooperative pause/cancel between dispatches
//! - **StageHooks**: host-side work for the non-shot phases

pub mod control;
pub mod dependency_analyzer;
pub mod dispatch;
pub mod engine;
pub mod parallel_executor;
pub mod phases;

pub use control::{ControlRequest, ExecutionControl};
pub use dependency_analyzer::{DependencyAnalyzer, DependencyGroup, ExecutionGraph};
pub use dispatch::{
    dispatcher_for, ProcessPoolDispatcher, ShotDispatcher, ShotRenderer, ThreadPoolDispatcher,
};
pub use engine::ExecutionEngine;
pub use parallel_executor::{GroupRun, ParallelEstimate, ParallelExecutor, ParallelRun};
pub use phases::{NoopStageHooks, PhaseOutcome, PhasePlan, StageContext, StageHooks};
