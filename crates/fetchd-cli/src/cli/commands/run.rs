//! `fetchd run` – run the scheduler and print batches as they complete.

use anyhow::{Context, Result};
use fetchd_core::config::FetchConfig;
use fetchd_core::fetch::CurlClient;
use fetchd_core::scheduler::{Scheduler, ShutdownHandle};
use fetchd_core::session::Batch;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::cli::signals;

pub async fn run_sessions(cfg: FetchConfig, pretty: bool) -> Result<()> {
    let client = Arc::new(CurlClient::new(cfg.http.clone()));
    let (scheduler, rx) = Scheduler::new(cfg, client);
    let shutdown = scheduler.shutdown_handle();
    let signal_task = signals::spawn_signal_listener(shutdown.clone());
    let printer = tokio::spawn(print_batches(rx, pretty, shutdown));

    let summary = scheduler.run().await;
    signal_task.abort();
    let printed = printer.await.context("printer task join")?;
    let summary = summary?;

    for s in &summary.skipped {
        eprintln!("fetchd: skipped session {}: {}", s.name, s.error);
    }
    if summary.crashed > 0 {
        anyhow::bail!("{} session task(s) crashed", summary.crashed);
    }
    tracing::info!(
        sessions = summary.sessions.len(),
        batches = summary.total_batches(),
        printed,
        "run finished"
    );
    Ok(())
}

/// Drains the result channel to stdout. If stdout goes away, stop the run
/// instead of fetching into the void.
async fn print_batches(
    mut rx: UnboundedReceiver<Batch>,
    pretty: bool,
    shutdown: ShutdownHandle,
) -> u64 {
    let mut printed = 0u64;
    while let Some(batch) = rx.recv().await {
        if let Err(e) = write_batch(&mut io::stdout().lock(), &batch, pretty) {
            tracing::warn!("cannot write results: {}", e);
            shutdown.request_shutdown();
            break;
        }
        printed += 1;
    }
    printed
}

pub(crate) fn write_batch(out: &mut impl Write, batch: &Batch, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, batch)?;
    } else {
        serde_json::to_writer(&mut *out, batch)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
