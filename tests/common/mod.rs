//! Shared fixtures for integration tests: production builders, a scripted
//! renderer, recording stage hooks and a checkpoint store that can be told to
//! fail.

#![allow(dead_code)]

pub mod strategies;

use async_trait::async_trait;
use parking_lot::Mutex;
use shotline_core::checkpoint::{
    CheckpointError, CheckpointRecord, CheckpointResult, CheckpointStore, MemoryCheckpointStore,
};
use shotline_core::config::EngineConfig;
use shotline_core::models::{
    CharacterConfig, LocationConfig, OutputConfig, ProductionConfig, ShotConfig,
};
use shotline_core::orchestration::{
    ControlRequest, ExecutionControl, ShotRenderer, StageContext, StageHooks,
};
use shotline_core::state_machine::ExecutionPhase;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn shot(name: &str, scene: u32, character: &str) -> ShotConfig {
    ShotConfig::new(name, scene).with_character(character)
}

/// `count` shots in scene 1, each with its own character
pub fn distinct_cast(count: usize) -> Vec<ShotConfig> {
    (0..count)
        .map(|i| shot(&format!("shot-{i}"), 1, &format!("actor-{i}")))
        .collect()
}

/// A production whose character and location tables cover every reference in
/// `shots`, with a single mp4 output
pub fn production(id: &str, shots: Vec<ShotConfig>) -> ProductionConfig {
    let mut config = ProductionConfig::new(id);
    for shot in &shots {
        for character in std::iter::once(shot.character.as_str())
            .chain(shot.secondary_character())
            .filter(|name| !name.is_empty())
        {
            config
                .characters
                .entry(character.to_string())
                .or_insert_with(CharacterConfig::default);
        }
        if !shot.location.is_empty() {
            config
                .locations
                .entry(shot.location.clone())
                .or_insert_with(LocationConfig::default);
        }
    }
    config.outputs.push(OutputConfig {
        name: "master".to_string(),
        format: "mp4".to_string(),
        resolution: Some([1920, 1080]),
        fps: Some(24),
    });
    config.shots = shots;
    config
}

/// Settings rooted in `dir`, no phase-boundary checkpoints
pub fn settings(dir: &Path, max_workers: usize, interval: usize) -> EngineConfig {
    let mut settings = EngineConfig {
        output_directory: dir.join("output"),
        ..EngineConfig::default()
    };
    settings.checkpoint.directory = dir.join("checkpoints");
    settings.checkpoint.interval = interval;
    settings.checkpoint.on_phase_boundary = false;
    settings.parallel.max_workers = max_workers;
    settings
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    Start,
    End,
}

/// Renderer whose behaviour per shot name is scripted up front. It records
/// every call and watches for overlapping renders.
#[derive(Default)]
pub struct ScriptedRenderer {
    rejects: HashSet<String>,
    errors: HashSet<String>,
    panics: HashSet<String>,
    delay: Duration,
    interrupt: Option<(usize, ExecutionControl, ControlRequest)>,
    calls: Mutex<Vec<String>>,
    events: Mutex<Vec<(String, RenderEvent)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    active_characters: Mutex<HashMap<String, usize>>,
    character_overlap: AtomicBool,
}

impl ScriptedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, name: &str) -> Self {
        self.rejects.insert(name.to_string());
        self
    }

    pub fn erroring(mut self, name: &str) -> Self {
        self.errors.insert(name.to_string());
        self
    }

    pub fn panicking(mut self, name: &str) -> Self {
        self.panics.insert(name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Issue `request` on `control` during the `nth` render call (1-based)
    pub fn interrupting_at(mut self, nth: usize, control: ExecutionControl, request: ControlRequest) -> Self {
        self.interrupt = Some((nth, control, request));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.as_str() == name).count()
    }

    pub fn events(&self) -> Vec<(String, RenderEvent)> {
        self.events.lock().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn saw_character_overlap(&self) -> bool {
        self.character_overlap.load(Ordering::SeqCst)
    }

    fn enter(&self, shot: &ShotConfig) {
        let call_number = {
            let mut calls = self.calls.lock();
            calls.push(shot.name.clone());
            calls.len()
        };
        self.events.lock().push((shot.name.clone(), RenderEvent::Start));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if shot.has_character() {
            let mut active = self.active_characters.lock();
            let count = active.entry(shot.character.clone()).or_insert(0);
            *count += 1;
            if *count > 1 {
                self.character_overlap.store(true, Ordering::SeqCst);
            }
        }

        if let Some((nth, control, request)) = &self.interrupt {
            if call_number == *nth {
                match request {
                    ControlRequest::Pause => control.pause(),
                    ControlRequest::Cancel => control.cancel(),
                }
            }
        }
    }

    fn leave(&self, shot: &ShotConfig) {
        if shot.has_character() {
            if let Some(count) = self.active_characters.lock().get_mut(&shot.character) {
                *count -= 1;
            }
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().push((shot.name.clone(), RenderEvent::End));
    }
}

impl ShotRenderer for ScriptedRenderer {
    fn render_shot(&self, shot: &ShotConfig) -> anyhow::Result<bool> {
        self.enter(shot);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.leave(shot);

        if self.panics.contains(&shot.name) {
            panic!("renderer crashed on {}", shot.name);
        }
        if self.errors.contains(&shot.name) {
            anyhow::bail!("no camera rig for {}", shot.name);
        }
        Ok(!self.rejects.contains(&shot.name))
    }
}

/// Stage hooks that record which phases ran and can fail one phase
#[derive(Default)]
pub struct RecordingHooks {
    fail_on: Option<ExecutionPhase>,
    fail_once: bool,
    failed: AtomicBool,
    calls: Mutex<Vec<ExecutionPhase>>,
    exported: Mutex<Vec<PathBuf>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(phase: ExecutionPhase) -> Self {
        Self {
            fail_on: Some(phase),
            ..Self::default()
        }
    }

    /// Fail `phase` the first time it runs only
    pub fn failing_once_on(phase: ExecutionPhase) -> Self {
        Self {
            fail_on: Some(phase),
            fail_once: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ExecutionPhase> {
        self.calls.lock().clone()
    }

    pub fn exported(&self) -> Vec<PathBuf> {
        self.exported.lock().clone()
    }

    fn record(&self, phase: ExecutionPhase) -> anyhow::Result<()> {
        self.calls.lock().push(phase);
        if self.fail_on == Some(phase) {
            let already_failed = self.failed.swap(true, Ordering::SeqCst);
            if !(self.fail_once && already_failed) {
                anyhow::bail!("{phase} hook refused to run");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StageHooks for RecordingHooks {
    async fn prepare(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        self.record(ExecutionPhase::Prepare)
    }

    async fn build_characters(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        self.record(ExecutionPhase::Characters)
    }

    async fn build_locations(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        self.record(ExecutionPhase::Locations)
    }

    async fn post_process(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        self.record(ExecutionPhase::PostProcess)
    }

    async fn export(&self, _ctx: &StageContext<'_>, outputs: &[PathBuf]) -> anyhow::Result<()> {
        self.exported.lock().extend(outputs.iter().cloned());
        self.record(ExecutionPhase::Export)
    }

    async fn finalize(&self, _ctx: &StageContext<'_>) -> anyhow::Result<()> {
        self.record(ExecutionPhase::Finalize)
    }
}

/// In-memory store that starts failing saves after `healthy_saves` successes
pub struct FlakyCheckpointStore {
    inner: MemoryCheckpointStore,
    healthy_saves: usize,
    attempts: AtomicUsize,
}

impl FlakyCheckpointStore {
    pub fn new(healthy_saves: usize) -> Self {
        Self {
            inner: MemoryCheckpointStore::new(),
            healthy_saves,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckpointStore for FlakyCheckpointStore {
    fn location(&self, production_id: &str) -> PathBuf {
        self.inner.location(production_id)
    }

    async fn save(&self, record: &CheckpointRecord) -> CheckpointResult<PathBuf> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.healthy_saves {
            return Err(CheckpointError::io(
                self.location(record.production_id()),
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.inner.save(record).await
    }

    async fn load(&self, production_id: &str) -> CheckpointResult<Option<CheckpointRecord>> {
        self.inner.load(production_id).await
    }

    async fn remove(&self, production_id: &str) -> CheckpointResult<bool> {
        self.inner.remove(production_id).await
    }

    async fn list(&self) -> CheckpointResult<Vec<String>> {
        self.inner.list().await
    }
}
