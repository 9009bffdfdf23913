//! Non-async mode: every target fetched once, one after another.
//!
//! No admission gate, no time window, no repetition. Each session still
//! produces a single [`Batch`] on the result channel.

use crate::config::SessionConfig;
use crate::fetch;
use crate::session::{Batch, RunnerContext, SessionReport};

/// Fetch each session's targets in order. Stops early between sessions when
/// the stop signal is raised.
pub async fn run_sequential(sessions: &[SessionConfig], ctx: &RunnerContext) -> Vec<SessionReport> {
    let mut reports = Vec::with_capacity(sessions.len());
    for session in sessions {
        if ctx.stop.is_set() {
            tracing::info!(session = %session.name, "stop requested; skipping session");
            break;
        }
        let mut results = Vec::with_capacity(session.url_suffixes.len());
        for url in session.targets() {
            results.push(fetch::fetch_one(ctx.client.as_ref(), &url, &[]).await);
        }
        let batch = Batch {
            session: session.name.clone(),
            seq: 1,
            window: None,
            results,
        };
        tracing::debug!(
            session = %batch.session,
            ok = batch.successes(),
            failed = batch.failures(),
            "sequential batch complete"
        );
        let delivered = ctx.results.send(batch).is_ok();
        reports.push(SessionReport {
            name: session.name.clone(),
            batches: 1,
        });
        if !delivered {
            tracing::warn!("result channel closed; stopping sequential run");
            break;
        }
    }
    reports
}
