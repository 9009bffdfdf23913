//! Aligned `[begin, end)` time windows for time-series endpoints.
//!
//! The window is a pure function of the session timings and the current
//! time, so two calls inside the same resolution bucket agree. Bounds are
//! signed: a span longer than `now` reaches before the epoch.

use serde::Serialize;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::TimingConfig;

/// Source of wall-clock time in whole epoch seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_epoch_secs(&self) -> i64;
}

/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            Err(e) => -i64::try_from(e.duration().as_secs()).unwrap_or(i64::MAX),
        }
    }
}

/// Query window in epoch seconds. `end` is a multiple of the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub begin: i64,
    pub end: i64,
}

impl TimeWindow {
    /// `end = floor(now / res) * res`, `begin = end - floor(span / res) * res`.
    /// A span shorter than the resolution gives `begin == end`. Flooring
    /// rounds toward negative infinity, also for instants before the epoch.
    ///
    /// Validated timings keep resolution and span within
    /// [`MAX_TIMING_SECS`](crate::config::MAX_TIMING_SECS), so the result is
    /// exact whenever `now` is within 2^62 seconds of the epoch.
    pub fn compute(timings: &TimingConfig, now: i64) -> Self {
        let res = i128::from(timings.resolution_seconds.max(1));
        let end = i128::from(now).div_euclid(res) * res;
        let span = i128::from(timings.span_seconds) / res * res;
        Self {
            begin: clamp_i64(end - span),
            end: clamp_i64(end),
        }
    }

    pub fn len_secs(&self) -> u64 {
        self.end.abs_diff(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Query parameters sent with each request.
    pub fn as_query(&self) -> Vec<(String, String)> {
        vec![
            ("begin".to_string(), self.begin.to_string()),
            ("end".to_string(), self.end.to_string()),
        ]
    }
}

fn clamp_i64(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX })
}
