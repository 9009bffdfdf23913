//! Session scheduler.
//!
//! Starts one [`SessionRunner`] per valid session on a `JoinSet`, feeds every
//! batch into one shared unbounded channel, and returns once every runner has
//! stopped. The channel closes when `run` returns.

mod shutdown;

pub use shutdown::ShutdownHandle;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

use crate::config::{FetchConfig, Mode, SkippedSession};
use crate::control::StopSignal;
use crate::fetch::HttpClient;
use crate::sequential;
use crate::session::{Batch, RunnerContext, SessionReport, SessionRunner};
use crate::time_window::{Clock, SystemClock};

/// Returned only when nothing can run at all.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("none of the {} configured session(s) is runnable", skipped.len())]
    NoRunnableSessions { skipped: Vec<SkippedSession> },
}

/// What happened during a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One report per session that started, in completion order.
    pub sessions: Vec<SessionReport>,
    /// Sessions rejected by validation.
    pub skipped: Vec<SkippedSession>,
    /// Runner tasks that panicked.
    pub crashed: usize,
}

impl RunSummary {
    pub fn total_batches(&self) -> u64 {
        self.sessions.iter().map(|s| s.batches).sum()
    }
}

/// Owns the session runners and the result channel.
pub struct Scheduler {
    config: FetchConfig,
    client: Arc<dyn HttpClient>,
    clock: Arc<dyn Clock>,
    stop: StopSignal,
    results: UnboundedSender<Batch>,
}

impl Scheduler {
    /// Build a scheduler and the receiving end of its result channel.
    pub fn new(config: FetchConfig, client: Arc<dyn HttpClient>) -> (Self, UnboundedReceiver<Batch>) {
        let (results, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            config,
            client,
            clock: Arc::new(SystemClock),
            stop: StopSignal::new(),
            results,
        };
        (scheduler, rx)
    }

    /// Replace the wall clock used for time windows.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Handle for requesting shutdown from outside (signal handler, tests).
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle::new(self.stop.clone())
    }

    fn context(&self) -> RunnerContext {
        RunnerContext {
            client: Arc::clone(&self.client),
            clock: Arc::clone(&self.clock),
            stop: self.stop.clone(),
            results: self.results.clone(),
            poll_interval: Duration::from_millis(self.config.poll_interval_ms),
        }
    }

    /// Run every session until all have stopped.
    pub async fn run(self) -> Result<RunSummary, SchedulerError> {
        let (sessions, skipped) = self.config.validated_sessions();
        for s in &skipped {
            tracing::warn!(session = %s.name, "skipping session: {}", s.error);
        }
        if sessions.is_empty() {
            if !skipped.is_empty() {
                return Err(SchedulerError::NoRunnableSessions { skipped });
            }
            tracing::warn!("no sessions configured");
            return Ok(RunSummary::default());
        }

        let mode = self.config.mode;
        let ctx = self.context();
        // Runners hold the only senders from here on, so the channel closes
        // as soon as the last one stops.
        drop(self);

        let mut summary = RunSummary {
            skipped,
            ..RunSummary::default()
        };
        match mode {
            Mode::Sequential => {
                tracing::info!(sessions = sessions.len(), "running sessions sequentially");
                summary.sessions = sequential::run_sequential(&sessions, &ctx).await;
            }
            Mode::Async => {
                tracing::info!(sessions = sessions.len(), "starting session runners");
                let mut join_set = JoinSet::new();
                for session in sessions {
                    let mut runner = SessionRunner::new(session, ctx.clone());
                    join_set.spawn(async move { runner.run().await });
                }
                drop(ctx);

                while let Some(res) = join_set.join_next().await {
                    match res {
                        Ok(report) => summary.sessions.push(report),
                        Err(e) => {
                            tracing::error!("session task join: {}", e);
                            summary.crashed += 1;
                        }
                    }
                }
            }
        }

        tracing::info!(
            sessions = summary.sessions.len(),
            batches = summary.total_batches(),
            "all sessions stopped"
        );
        Ok(summary)
    }
}
