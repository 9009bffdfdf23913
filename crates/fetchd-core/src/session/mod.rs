//! Drives one session: build targets, fan out fetches under the admission
//! gate, deliver the batch, sleep for the period, repeat until stopped.
//!
//! State machine: `Idle -> Running -> Sleeping -> Running -> ... -> Stopped`.
//! Sessions without timings run a single batch.

mod batch;

pub use batch::Batch;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use crate::config::SessionConfig;
use crate::control::{SleepOutcome, StopSignal};
use crate::fetch::{self, FetchOutcome, HttpClient};
use crate::gate::AdmissionGate;
use crate::time_window::{Clock, TimeWindow};

/// Lifecycle state of a [`SessionRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Sleeping,
    Stopped,
}

/// Summary returned when a runner stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub name: String,
    pub batches: u64,
}

/// Shared collaborators handed to each runner.
#[derive(Clone)]
pub struct RunnerContext {
    pub client: Arc<dyn HttpClient>,
    pub clock: Arc<dyn Clock>,
    pub stop: StopSignal,
    pub results: UnboundedSender<Batch>,
    pub poll_interval: Duration,
}

/// Repeating fetch loop for one session.
pub struct SessionRunner {
    config: SessionConfig,
    targets: Arc<Vec<String>>,
    gate: AdmissionGate,
    ctx: RunnerContext,
    state: RunnerState,
    batches: u64,
}

impl SessionRunner {
    pub fn new(config: SessionConfig, ctx: RunnerContext) -> Self {
        let targets = Arc::new(config.targets());
        let gate = AdmissionGate::new(config.max_concurrency);
        Self {
            config,
            targets,
            gate,
            ctx,
            state: RunnerState::Idle,
            batches: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// The session's gate; exposed so callers can observe `peak()`.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    fn transition(&mut self, next: RunnerState) {
        tracing::debug!(
            session = %self.config.name,
            from = ?self.state,
            to = ?next,
            "session state"
        );
        self.state = next;
    }

    /// Run until stopped (or after one batch when the session has no timings).
    pub async fn run(&mut self) -> SessionReport {
        if self.state == RunnerState::Stopped {
            return self.report();
        }
        tracing::info!(
            session = %self.config.name,
            targets = self.targets.len(),
            max_concurrency = self.gate.capacity(),
            periodic = self.config.timings.is_some(),
            "session started"
        );

        loop {
            if self.ctx.stop.is_set() {
                break;
            }
            self.transition(RunnerState::Running);
            let batch = self.run_batch().await;
            if self.ctx.results.send(batch).is_err() {
                tracing::warn!(session = %self.config.name, "result channel closed; stopping");
                break;
            }

            let Some(timings) = self.config.timings else {
                break;
            };
            if self.ctx.stop.is_set() {
                break;
            }
            self.transition(RunnerState::Sleeping);
            let period = Duration::from_secs(timings.period_seconds);
            if self.ctx.stop.sleep(period, self.ctx.poll_interval).await
                == SleepOutcome::Interrupted
            {
                break;
            }
        }

        self.transition(RunnerState::Stopped);
        tracing::info!(
            session = %self.config.name,
            batches = self.batches,
            "session stopped"
        );
        self.report()
    }

    fn report(&self) -> SessionReport {
        SessionReport {
            name: self.config.name.clone(),
            batches: self.batches,
        }
    }

    /// One repetition: fresh window, every target fetched under the gate,
    /// outcomes gathered as they complete.
    async fn run_batch(&mut self) -> Batch {
        self.batches += 1;
        let seq = self.batches;
        let started = Instant::now();
        let window = self
            .config
            .timings
            .as_ref()
            .map(|t| TimeWindow::compute(t, self.ctx.clock.now_epoch_secs()));
        let params = Arc::new(window.map(|w| w.as_query()).unwrap_or_default());

        let mut set = JoinSet::new();
        for (idx, url) in self.targets.iter().enumerate() {
            let url = url.clone();
            let gate = self.gate.clone();
            let client = Arc::clone(&self.ctx.client);
            let params = Arc::clone(&params);
            set.spawn(async move {
                let outcome = match gate.acquire().await {
                    Ok(_permit) => fetch::fetch_one(client.as_ref(), &url, &params).await,
                    Err(e) => FetchOutcome::failure(url, e.to_string()),
                };
                (idx, outcome)
            });
        }

        let mut done = vec![false; self.targets.len()];
        let mut results = Vec::with_capacity(self.targets.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => {
                    done[idx] = true;
                    results.push(outcome);
                }
                Err(e) => {
                    tracing::error!(session = %self.config.name, "fetch task failed: {}", e);
                }
            }
        }
        // A task that panicked never reported; record it against its target.
        for (idx, _) in done.iter().enumerate().filter(|(_, d)| !**d) {
            results.push(FetchOutcome::failure(
                self.targets[idx].clone(),
                "fetch task panicked",
            ));
        }

        let batch = Batch {
            session: self.config.name.clone(),
            seq,
            window,
            results,
        };
        tracing::debug!(
            session = %batch.session,
            seq,
            ok = batch.successes(),
            failed = batch.failures(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch complete"
        );
        batch
    }
}
