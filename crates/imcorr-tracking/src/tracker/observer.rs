use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress and cancellation hooks of a tracking run.
///
/// Called from worker threads when the `rayon` feature is enabled.
pub trait TrackObserver: Sync {
    /// `done` of `total` lattice points have been processed.
    fn on_progress(&self, _done: usize, _total: usize) {}

    /// Checked before every lattice point.
    fn should_stop(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl TrackObserver for NoopObserver {}

/// Shared stop flag; clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl TrackObserver for CancelToken {
    fn should_stop(&self) -> bool {
        self.is_cancelled()
    }
}
