//! # Parallel Executor
//!
//! Runs shots group by group through a bounded worker pool.
//!
//! ## Execution Model
//!
//! - Groups from the [`DependencyAnalyzer`] run strictly in order.
//! - Within a group, each shot acquires one of `max_workers` semaphore permits
//!   before it is dispatched, so at most `max_workers` shots render at once.
//! - Every shot of a group finishes, rendered or not, before any shot of the
//!   next group is dispatched. Joining the whole group is that barrier.
//! - Workers report through a concurrent map keyed by shot index. They never
//!   touch the execution state; the caller applies the reports afterwards.
//!
//! Pause and cancel requests are checked before each dispatch. Shots already
//! running are allowed to finish.

use super::control::{ControlRequest, ExecutionControl};
use super::dependency_analyzer::{DependencyAnalyzer, ExecutionGraph};
use super::dispatch::ShotDispatcher;
use crate::config::ParallelConfig;
use crate::models::{ShotConfig, ShotOutcome, ShotReport};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

/// Reports for one group, in shot index order
#[derive(Debug, Clone, Default)]
pub struct GroupRun {
    pub reports: Vec<ShotReport>,
    /// Set when a pause or cancel stopped dispatching part way through
    pub interrupted: Option<ControlRequest>,
    /// First shot of the group that was not dispatched
    pub next_undispatched: Option<usize>,
}

/// Outcome of a standalone parallel run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelRun {
    /// Shot index to rendered/not-rendered
    pub results: BTreeMap<usize, bool>,
    pub errors: Vec<String>,
}

/// Idealized cost comparison, in units of one shot render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParallelEstimate {
    pub sequential_time: usize,
    pub parallel_time: usize,
    pub speedup_factor: f64,
}

#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    config: ParallelConfig,
    analyzer: DependencyAnalyzer,
}

impl ParallelExecutor {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
            analyzer: DependencyAnalyzer::new(),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.config.max_workers.max(1)
    }

    pub fn analyze(&self, shots: &[ShotConfig]) -> ExecutionGraph {
        self.analyzer.analyze(shots)
    }

    /// Dispatch `indices` of `shots` and wait for all of them to finish
    #[instrument(skip(self, shots, dispatcher, control), fields(group_size = indices.len()))]
    pub async fn execute_group(
        &self,
        indices: &[usize],
        shots: &[ShotConfig],
        dispatcher: Arc<dyn ShotDispatcher>,
        control: &ExecutionControl,
    ) -> GroupRun {
        let semaphore = Arc::new(Semaphore::new(self.max_workers()));
        let reports: Arc<DashMap<usize, ShotReport>> = Arc::new(DashMap::new());
        let mut workers = JoinSet::new();
        let mut dispatched = Vec::with_capacity(indices.len());
        let mut run = GroupRun::default();

        for &index in indices {
            let Some(shot) = shots.get(index).cloned() else {
                reports.insert(
                    index,
                    ShotReport::new(
                        index,
                        ShotOutcome::Errored(format!("no shot at index {index}")),
                        Duration::ZERO,
                    ),
                );
                dispatched.push(index);
                continue;
            };

            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(error = %e, "Worker pool closed before group finished dispatching");
                    run.next_undispatched = Some(index);
                    break;
                }
            };

            if let Some(request) = control.requested() {
                debug!(shot_index = index, request = %request, "Stopping dispatch");
                run.interrupted = Some(request);
                run.next_undispatched = Some(index);
                break;
            }

            let dispatcher = Arc::clone(&dispatcher);
            let reports = Arc::clone(&reports);
            dispatched.push(index);
            workers.spawn(async move {
                let _permit = permit;
                let started = Instant::now();
                let outcome = dispatcher.dispatch(index, shot).await;
                reports.insert(index, ShotReport::new(index, outcome, started.elapsed()));
            });
        }

        // Barrier: the group is done only when every worker has returned
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Shot worker terminated abnormally");
            }
        }

        dispatched.sort_unstable();
        run.reports = dispatched
            .into_iter()
            .map(|index| {
                reports.remove(&index).map(|(_, report)| report).unwrap_or_else(|| {
                    ShotReport::new(
                        index,
                        ShotOutcome::Errored("worker terminated before reporting".to_string()),
                        Duration::ZERO,
                    )
                })
            })
            .collect();

        run
    }

    /// Run every shot through its dependency group, independent of an engine
    #[instrument(skip(self, shots, dispatcher), fields(shot_count = shots.len()))]
    pub async fn execute_shots_parallel(
        &self,
        shots: &[ShotConfig],
        dispatcher: Arc<dyn ShotDispatcher>,
    ) -> ParallelRun {
        let graph = self.analyze(shots);
        let control = ExecutionControl::new();
        let mut run = ParallelRun::default();

        info!(
            groups = graph.len(),
            max_workers = self.max_workers(),
            backend = ?dispatcher.backend(),
            "Starting parallel shot run"
        );

        for group in graph.iter() {
            let indices: Vec<usize> = group.shot_indices.iter().copied().collect();
            let group_run = self
                .execute_group(&indices, shots, Arc::clone(&dispatcher), &control)
                .await;

            for report in group_run.reports {
                let name = shots
                    .get(report.index)
                    .map(|shot| shot.name.as_str())
                    .unwrap_or("<unknown>");
                if let Some(message) = report.outcome.error_message(name) {
                    run.errors.push(message);
                }
                run.results.insert(report.index, report.outcome.is_success());
            }

            debug!(group_id = group.group_id, "Group barrier reached");
        }

        run
    }

    /// Compare one-at-a-time rendering with grouped rendering on `workers`
    pub fn get_parallel_estimate(&self, shots: &[ShotConfig], workers: usize) -> ParallelEstimate {
        let workers = workers.max(1);
        let graph = self.analyze(shots);

        let sequential_time = shots.len();
        let parallel_time = graph
            .iter()
            .map(|group| group.len().div_ceil(workers))
            .sum::<usize>();
        let speedup_factor = if parallel_time == 0 {
            1.0
        } else {
            sequential_time as f64 / parallel_time as f64
        };

        ParallelEstimate {
            sequential_time,
            parallel_time,
            speedup_factor,
        }
    }

    /// Workers worth allocating: never more than the largest group can use
    pub fn optimize_worker_count(&self, shots: &[ShotConfig], max_available: usize) -> usize {
        self.analyze(shots).largest_group_size().min(max_available)
    }
}
