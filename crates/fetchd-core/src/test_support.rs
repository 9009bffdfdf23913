//! In-process fakes for the transport and the clock.

use async_trait::async_trait;
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::fetch::{build_url, HttpClient, HttpResponse, TransportError};
use crate::time_window::Clock;

/// Answers every GET with 200 and a body the length of the URL, after an
/// optional delay. URLs in `failing` get a connection error instead.
#[derive(Debug, Default)]
pub struct FakeClient {
    pub delay: Duration,
    pub failing: HashSet<String>,
    pub statuses: Vec<(String, u32)>,
    pub delays: Vec<(String, Duration)>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn instant() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn delay_for(mut self, url: &str, delay: Duration) -> Self {
        self.delays.push((url.to_string(), delay));
        self
    }

    pub fn status(mut self, url: &str, status: u32) -> Self {
        self.statuses.push((url.to_string(), status));
        self
    }

    /// Full request URLs (with query) in call order.
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let full = build_url(url, params)?;
        self.requested.lock().unwrap().push(full);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self
            .delays
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, d)| *d)
            .unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        let status = self
            .statuses
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, s)| *s)
            .unwrap_or(200);
        Ok(HttpResponse {
            status,
            body_len: url.len() as u64,
        })
    }
}

/// Clock that advances by `step` seconds on every read.
#[derive(Debug)]
pub struct SteppingClock {
    now: AtomicI64,
    step: i64,
}

impl SteppingClock {
    pub fn new(start: i64, step: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
            step,
        }
    }

    pub fn fixed(now: i64) -> Self {
        Self::new(now, 0)
    }
}

impl Clock for SteppingClock {
    fn now_epoch_secs(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}
