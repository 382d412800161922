use std::sync::atomic::{AtomicBool, Ordering};

use hl_core::{Error, Result};

/// Minimal progress indicator threaded through analysis. There is no
/// user-cancel signal; the only designed aborts are threshold breaches and
/// the finalize timeout, so cancellation stays unset in normal runs.
#[derive(Debug, Default)]
pub struct ProgressIndicator {
    cancelled: AtomicBool,
}

impl ProgressIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Internal("analysis cancelled".into()));
        }
        Ok(())
    }
}

/// Run a task under a fresh progress indicator.
pub fn run_process<R>(task: impl FnOnce(&ProgressIndicator) -> R) -> R {
    let indicator = ProgressIndicator::new();
    task(&indicator)
}
