//! # Shot Dispatch
//!
//! How a single shot gets rendered. The engine and the parallel executor never
//! call a renderer directly; they hand shots to a [`ShotDispatcher`], chosen
//! from [`ExecutorBackend`]:
//!
//! - [`ThreadPoolDispatcher`] runs an in-process [`ShotRenderer`] on tokio's
//!   blocking pool.
//! - [`ProcessPoolDispatcher`] launches one renderer process per shot and
//!   feeds it the shot description as JSON on stdin.
//!
//! Every failure mode of a dispatch ends up as a [`ShotOutcome`]. A renderer
//! error or panic never escapes the shot boundary.

use crate::config::{ConfigurationError, ExecutorBackend, ParallelConfig, ProcessBackendConfig};
use crate::models::{ShotConfig, ShotOutcome};
use async_trait::async_trait;
use std::any::Any;
use std::io::ErrorKind;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variable carrying the shot index to process-backend renderers
pub const SHOT_INDEX_ENV: &str = "SHOTLINE_SHOT_INDEX";

/// Renders one shot. `Ok(false)` is a clean rejection; `Err` is an error.
///
/// Implementations are synchronous and may block for as long as the render
/// takes.
pub trait ShotRenderer: Send + Sync {
    fn render_shot(&self, shot: &ShotConfig) -> anyhow::Result<bool>;
}

impl<F> ShotRenderer for F
where
    F: Fn(&ShotConfig) -> anyhow::Result<bool> + Send + Sync,
{
    fn render_shot(&self, shot: &ShotConfig) -> anyhow::Result<bool> {
        self(shot)
    }
}

/// Execution strategy for a single shot
#[async_trait]
pub trait ShotDispatcher: Send + Sync {
    fn backend(&self) -> ExecutorBackend;

    async fn dispatch(&self, index: usize, shot: ShotConfig) -> ShotOutcome;
}

/// Build the dispatcher selected by `config.backend`
pub fn dispatcher_for(
    config: &ParallelConfig,
    renderer: Arc<dyn ShotRenderer>,
) -> Result<Arc<dyn ShotDispatcher>, ConfigurationError> {
    match config.backend {
        ExecutorBackend::Thread => Ok(Arc::new(ThreadPoolDispatcher::new(renderer))),
        ExecutorBackend::Process => {
            let process = config.process.clone().ok_or_else(|| {
                ConfigurationError::missing_required_field(
                    "parallel.process",
                    "process executor backend",
                )
            })?;
            Ok(Arc::new(ProcessPoolDispatcher::new(process)))
        }
    }
}

#[derive(Clone)]
pub struct ThreadPoolDispatcher {
    renderer: Arc<dyn ShotRenderer>,
}

impl ThreadPoolDispatcher {
    pub fn new(renderer: Arc<dyn ShotRenderer>) -> Self {
        Self { renderer }
    }
}

impl std::fmt::Debug for ThreadPoolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolDispatcher").finish_non_exhaustive()
    }
}

#[async_trait]
impl ShotDispatcher for ThreadPoolDispatcher {
    fn backend(&self) -> ExecutorBackend {
        ExecutorBackend::Thread
    }

    async fn dispatch(&self, index: usize, shot: ShotConfig) -> ShotOutcome {
        let renderer = Arc::clone(&self.renderer);
        let joined = tokio::task::spawn_blocking(move || renderer.render_shot(&shot)).await;

        match joined {
            Ok(Ok(true)) => ShotOutcome::Rendered,
            Ok(Ok(false)) => ShotOutcome::Rejected,
            Ok(Err(error)) => ShotOutcome::Errored(format!("{error:#}")),
            Err(join_error) if join_error.is_panic() => {
                let message = panic_message(join_error.into_panic());
                warn!(shot_index = index, panic = %message, "Renderer panicked");
                ShotOutcome::Errored(format!("renderer panicked: {message}"))
            }
            Err(join_error) => ShotOutcome::Errored(format!("render task aborted: {join_error}")),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// One external renderer process per shot.
///
/// Exit code 0 means rendered, any other exit code means rejected. Failing to
/// launch the program, or a process killed by a signal, is an error.
#[derive(Debug, Clone)]
pub struct ProcessPoolDispatcher {
    command: ProcessBackendConfig,
}

impl ProcessPoolDispatcher {
    pub fn new(command: ProcessBackendConfig) -> Self {
        Self { command }
    }

    async fn run(&self, index: usize, shot: &ShotConfig) -> Result<ShotOutcome, String> {
        let payload = serde_json::to_vec(shot).map_err(|e| format!("cannot encode shot: {e}"))?;

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .env(SHOT_INDEX_ENV, index.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                format!(
                    "cannot launch renderer '{}': {e}",
                    self.command.program.display()
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A renderer that exits without reading its input is judged by its exit code
            match stdin.write_all(&payload).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
                Err(e) => return Err(format!("cannot write shot to renderer: {e}")),
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| format!("renderer process failed: {e}"))?;

        if !output.stderr.is_empty() {
            debug!(
                shot_index = index,
                stderr = %String::from_utf8_lossy(&output.stderr).trim_end(),
                "Renderer diagnostics"
            );
        }

        match output.status.code() {
            Some(0) => Ok(ShotOutcome::Rendered),
            Some(code) => {
                debug!(shot_index = index, exit_code = code, "Renderer rejected shot");
                Ok(ShotOutcome::Rejected)
            }
            None => Err(format!("renderer terminated abnormally ({})", output.status)),
        }
    }
}

#[async_trait]
impl ShotDispatcher for ProcessPoolDispatcher {
    fn backend(&self) -> ExecutorBackend {
        ExecutorBackend::Process
    }

    async fn dispatch(&self, index: usize, shot: ShotConfig) -> ShotOutcome {
        match self.run(index, &shot).await {
            Ok(outcome) => outcome,
            Err(message) => ShotOutcome::Errored(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shot() -> ShotConfig {
        ShotConfig::new("opening", 1).with_character("hero")
    }

    #[tokio::test]
    async fn test_thread_dispatcher_maps_renderer_results() {
        let accept = ThreadPoolDispatcher::new(Arc::new(
            |_: &ShotConfig| -> anyhow::Result<bool> { Ok(true) },
        ));
        let reject = ThreadPoolDispatcher::new(Arc::new(
            |_: &ShotConfig| -> anyhow::Result<bool> { Ok(false) },
        ));
        let error = ThreadPoolDispatcher::new(Arc::new(
            |shot: &ShotConfig| -> anyhow::Result<bool> {
                anyhow::bail!("missing rig for {}", shot.character)
            },
        ));

        assert_eq!(accept.dispatch(0, shot()).await, ShotOutcome::Rendered);
        assert_eq!(reject.dispatch(0, shot()).await, ShotOutcome::Rejected);
        assert_eq!(
            error.dispatch(0, shot()).await,
            ShotOutcome::Errored("missing rig for hero".to_string())
        );
    }

    #[tokio::test]
    async fn test_thread_dispatcher_contains_panics() {
        let dispatcher = ThreadPoolDispatcher::new(Arc::new(|_: &ShotConfig| -> anyhow::Result<bool> {
            panic!("viewport exploded")
        }));

        match dispatcher.dispatch(3, shot()).await {
            ShotOutcome::Errored(message) => assert!(message.contains("viewport exploded")),
            other => panic!("expected an error outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_selection() {
        let renderer: Arc<dyn ShotRenderer> =
            Arc::new(|_: &ShotConfig| -> anyhow::Result<bool> { Ok(true) });
        let mut config = ParallelConfig::default();
        let dispatcher = dispatcher_for(&config, Arc::clone(&renderer)).unwrap();
        assert_eq!(dispatcher.backend(), ExecutorBackend::Thread);

        config.backend = ExecutorBackend::Process;
        assert!(dispatcher_for(&config, Arc::clone(&renderer)).is_err());

        config.process = Some(ProcessBackendConfig {
            program: PathBuf::from("render-shot"),
            args: Vec::new(),
        });
        let dispatcher = dispatcher_for(&config, renderer).unwrap();
        assert_eq!(dispatcher.backend(), ExecutorBackend::Process);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_dispatcher_uses_exit_status() {
        let dispatcher = |script: &str| {
            ProcessPoolDispatcher::new(ProcessBackendConfig {
                program: PathBuf::from("sh"),
                args: vec!["-c".to_string(), script.to_string()],
            })
        };

        assert_eq!(
            dispatcher("cat > /dev/null; exit 0").dispatch(0, shot()).await,
            ShotOutcome::Rendered
        );
        assert_eq!(
            dispatcher("exit 4").dispatch(1, shot()).await,
            ShotOutcome::Rejected
        );
        assert_eq!(
            dispatcher("grep -q '\"character\":\"hero\"'").dispatch(2, shot()).await,
            ShotOutcome::Rendered
        );
        assert_eq!(
            dispatcher("test \"$SHOTLINE_SHOT_INDEX\" = 7").dispatch(7, shot()).await,
            ShotOutcome::Rendered
        );
    }

    #[tokio::test]
    async fn test_process_dispatcher_reports_launch_failure() {
        let dispatcher = ProcessPoolDispatcher::new(ProcessBackendConfig {
            program: PathBuf::from("/nonexistent/shotline-renderer"),
            args: Vec::new(),
        });

        assert!(matches!(
            dispatcher.dispatch(0, shot()).await,
            ShotOutcome::Errored(_)
        ));
    }
}
