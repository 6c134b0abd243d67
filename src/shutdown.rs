//! Stop coordination for sorting runs.
//!
//! Two sources can stop a run from admitting further copy units:
//! - the process-wide flag, set from the Ctrl-C handler via [`request`];
//! - a per-run [`StopHandle`], which tests and embedders can trip directly.
//!
//! Relaxed atomics are enough here: the flags are one-way and nothing else is
//! published through them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a process-wide stop (idempotent, signal-handler safe).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Whether a process-wide stop has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Cloneable stop switch scoped to a single run.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    local: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip this handle only; other runs are unaffected.
    pub fn stop(&self) {
        self.local.store(true, Ordering::Relaxed);
    }

    /// True once either this handle or the process-wide flag was tripped.
    pub fn should_stop(&self) -> bool {
        self.local.load(Ordering::Relaxed) || is_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_stop_is_shared_between_clones() {
        let a = StopHandle::new();
        let b = a.clone();
        assert!(!b.local.load(Ordering::Relaxed));
        a.stop();
        assert!(b.should_stop());
    }

    #[test]
    fn fresh_handles_are_independent() {
        let a = StopHandle::new();
        let b = StopHandle::new();
        a.stop();
        assert!(a.local.load(Ordering::Relaxed));
        assert!(!b.local.load(Ordering::Relaxed));
    }
}
