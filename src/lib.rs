#![allow(clippy::doc_markdown)] // Allow technical terms like JSON, YAML in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Shotline Core
//!
//! Production execution engine for multi-shot film productions.
//!
//! ## Overview
//!
//! A production is a set of characters, locations, an ordered shot list and
//! output formats. This crate drives a production through a fixed, resumable
//! pipeline of eight phases, renders its shots concurrently without letting
//! shots that share a scene boundary or a character overlap, and checkpoints
//! progress so a paused or failed run can pick up where it stopped.
//!
//! Scene assembly and rendering live outside this crate behind the
//! [`orchestration::ShotRenderer`] and [`orchestration::StageHooks`] traits.
//!
//! ## Key Features
//!
//! - **Phase state machine**: validate, prepare, characters, locations, shots,
//!   post_process, export, finalize
//! - **Dependency-aware grouping**: greedy partition of shots by scene and
//!   primary character
//! - **Bounded worker pool**: thread-pool or process-pool backend, with a
//!   barrier between groups
//! - **Partial-failure isolation**: a failed shot never stops its siblings
//! - **Checkpoint/resume**: exact round trip of the execution state
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Run statuses, phases, events and the execution state
//! - [`models`] - Production description and run results
//! - [`validation`] - Production validators
//! - [`orchestration`] - Engine, dependency analysis, parallel execution
//! - [`checkpoint`] - Checkpoint records and stores
//! - [`config`] - Engine settings and the layered loader
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shotline_core::config::EngineConfig;
//! use shotline_core::models::{ProductionConfig, ShotConfig};
//! use shotline_core::orchestration::{ExecutionEngine, ShotRenderer};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let production = ProductionConfig::load_from_file("productions/trailer.yaml").unwrap();
//! let renderer: Arc<dyn ShotRenderer> =
//!     Arc::new(|shot: &ShotConfig| -> anyhow::Result<bool> { Ok(!shot.name.is_empty()) });
//!
//! let mut engine = ExecutionEngine::new(production, EngineConfig::default(), renderer).unwrap();
//! let result = engine.execute().await.unwrap();
//! println!("success={} rendered={}", result.success, result.shots_completed);
//! # });
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod checkpoint;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod state_machine;
pub mod validation;

pub use checkpoint::{
    CheckpointError, CheckpointRecord, CheckpointStore, FileCheckpointStore, MemoryCheckpointStore,
};
pub use config::{ConfigManager, EngineConfig, ExecutorBackend, ParallelConfig};
pub use error::{EngineError, EngineResult, ResumeError};
pub use models::{ProductionConfig, ProductionResult, ShotConfig, ShotOutcome};
pub use orchestration::{
    DependencyAnalyzer, ExecutionControl, ExecutionEngine, ExecutionGraph, ParallelExecutor,
    ShotDispatcher, ShotRenderer,
};
pub use state_machine::{ExecutionPhase, ExecutionState, RunEvent, RunStatus};
