//! `fetchd check` – validate sessions and show their targets and windows.

use anyhow::Result;
use fetchd_core::config::{FetchConfig, Mode};
use fetchd_core::time_window::{Clock, SystemClock, TimeWindow};

pub fn run_check(cfg: &FetchConfig) -> Result<()> {
    let (sessions, skipped) = cfg.validated_sessions();
    let now = SystemClock.now_epoch_secs();
    println!(
        "mode: {}",
        match cfg.mode {
            Mode::Async => "async",
            Mode::Sequential => "sequential",
        }
    );
    for s in &sessions {
        println!(
            "{:<16} {:>5} url(s)  max-parallel {:<6} {}",
            s.name,
            s.url_suffixes.len(),
            s.max_concurrency,
            match s.timings {
                Some(t) => {
                    let w = TimeWindow::compute(&t, now);
                    format!(
                        "every {}s, window begin={} end={}",
                        t.period_seconds, w.begin, w.end
                    )
                }
                None => "one-shot".to_string(),
            }
        );
    }
    for s in &skipped {
        println!("{:<16} INVALID: {}", s.name, s.error);
    }
    if sessions.is_empty() && !skipped.is_empty() {
        anyhow::bail!("no runnable sessions");
    }
    Ok(())
}
