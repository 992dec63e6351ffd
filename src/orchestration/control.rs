//! Cooperative pause/cancel requests.
//!
//! An [`ExecutionControl`] is shared between the task driving a run and any
//! number of other tasks. Requests are only observed between shot dispatches;
//! a shot that is already rendering always finishes. Cancel takes precedence
//! over pause.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const NONE: u8 = 0;
const PAUSE: u8 = 1;
const CANCEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest {
    Pause,
    Cancel,
}

impl fmt::Display for ControlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pause => write!(f, "pause"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExecutionControl {
    request: Arc<AtomicU8>,
}

impl ExecutionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to pause at the next dispatch boundary
    pub fn pause(&self) {
        let _ = self
            .request
            .compare_exchange(NONE, PAUSE, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Ask the run to stop at the next dispatch boundary
    pub fn cancel(&self) {
        self.request.store(CANCEL, Ordering::SeqCst);
    }

    /// The pending request, left in place
    pub fn requested(&self) -> Option<ControlRequest> {
        Self::decode(self.request.load(Ordering::SeqCst))
    }

    /// The pending request, cleared
    pub fn take(&self) -> Option<ControlRequest> {
        Self::decode(self.request.swap(NONE, Ordering::SeqCst))
    }

    fn decode(value: u8) -> Option<ControlRequest> {
        match value {
            PAUSE => Some(ControlRequest::Pause),
            CANCEL => Some(ControlRequest::Cancel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_shared_between_clones() {
        let control = ExecutionControl::new();
        let remote = control.clone();
        assert_eq!(control.requested(), None);

        remote.pause();
        assert_eq!(control.requested(), Some(ControlRequest::Pause));
        assert_eq!(control.take(), Some(ControlRequest::Pause));
        assert_eq!(remote.requested(), None);
    }

    #[test]
    fn test_cancel_overrides_pause() {
        let control = ExecutionControl::new();
        control.cancel();
        control.pause();
        assert_eq!(control.requested(), Some(ControlRequest::Cancel));

        let control = ExecutionControl::new();
        control.pause();
        control.cancel();
        assert_eq!(control.take(), Some(ControlRequest::Cancel));
        assert_eq!(control.take(), None);
    }
}
