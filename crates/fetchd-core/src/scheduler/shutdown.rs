//! External shutdown trigger.

use crate::control::StopSignal;

/// Cloneable handle that raises the scheduler's stop signal.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    stop: StopSignal,
}

impl ShutdownHandle {
    pub(super) fn new(stop: StopSignal) -> Self {
        Self { stop }
    }

    /// Ask every session to stop at its next checkpoint. Idempotent: only the
    /// first call has any effect.
    pub fn request_shutdown(&self) {
        if self.stop.set() {
            tracing::info!("shutdown requested");
        }
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.stop.is_set()
    }
}
