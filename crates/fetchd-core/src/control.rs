//! Cooperative stop signal shared by the scheduler and every session.
//!
//! Sessions check the flag before starting a batch and while sleeping between
//! periods; an in-flight batch always runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Lower bound on the poll slice so a zero interval cannot spin.
const MIN_POLL: Duration = Duration::from_millis(1);

/// How an interruptible sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    /// Slept the full duration.
    Elapsed,
    /// Stop was observed before the duration elapsed.
    Interrupted,
}

/// One-way stop flag. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Raise the signal. Returns true only for the call that flipped it.
    pub fn set(&self) -> bool {
        !self.flag.swap(true, Ordering::AcqRel)
    }

    /// Sleep for `total`, waking every `poll` to check the flag. A `total`
    /// past the clock's range sleeps until stopped.
    pub async fn sleep(&self, total: Duration, poll: Duration) -> SleepOutcome {
        let poll = poll.max(MIN_POLL);
        let Some(deadline) = Instant::now().checked_add(total) else {
            while !self.is_set() {
                tokio::time::sleep(poll).await;
            }
            return SleepOutcome::Interrupted;
        };
        loop {
            if self.is_set() {
                return SleepOutcome::Interrupted;
            }
            let now = Instant::now();
            if now >= deadline {
                return SleepOutcome::Elapsed;
            }
            tokio::time::sleep((deadline - now).min(poll)).await;
        }
    }
}
