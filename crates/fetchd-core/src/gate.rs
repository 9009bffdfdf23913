//! Per-session admission gate bounding concurrent fetches.
//!
//! Wraps a FIFO-fair tokio semaphore. The returned [`GatePermit`] releases its
//! slot on drop, so a failing or panicking fetch never leaks capacity.
//! `active` / `peak` counters are kept for observation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Default)]
struct GateCounters {
    active: AtomicUsize,
    peak: AtomicUsize,
}

/// Counting gate with a fixed capacity. Cheap to clone; clones share slots.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    capacity: usize,
    semaphore: Arc<Semaphore>,
    counters: Arc<GateCounters>,
}

/// One admitted holder. Dropping it is the release.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<GateCounters>,
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        // Runs before the semaphore permit is returned, so `active` never
        // overshoots capacity.
        self.counters.active.fetch_sub(1, Ordering::AcqRel);
    }
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` holders (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            semaphore: Arc::new(Semaphore::new(capacity)),
            counters: Arc::new(GateCounters::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a free slot. Waiters are admitted in arrival order.
    pub async fn acquire(&self) -> Result<GatePermit, AcquireError> {
        let permit = Arc::clone(&self.semaphore).acquire_owned().await?;
        let now = self.counters.active.fetch_add(1, Ordering::AcqRel) + 1;
        self.counters.peak.fetch_max(now, Ordering::AcqRel);
        Ok(GatePermit {
            _permit: permit,
            counters: Arc::clone(&self.counters),
        })
    }

    /// Holders currently admitted.
    pub fn active(&self) -> usize {
        self.counters.active.load(Ordering::Acquire)
    }

    /// Highest number of simultaneous holders seen so far.
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::Acquire)
    }

    /// Free slots right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
