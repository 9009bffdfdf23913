//! One repetition's worth of outcomes for one session.

use serde::Serialize;

use crate::fetch::FetchOutcome;
use crate::time_window::TimeWindow;

/// Outcomes of one repetition, in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    /// Session name.
    pub session: String,
    /// 1-based repetition number within the session.
    pub seq: u64,
    /// Window sent as `begin` / `end`, if the session has timings.
    pub window: Option<TimeWindow>,
    pub results: Vec<FetchOutcome>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn successes(&self) -> usize {
        self.results.iter().filter(|o| o.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.len() - self.successes()
    }
}
