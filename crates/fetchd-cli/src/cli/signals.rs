//! Maps process signals onto the scheduler's shutdown handle.
//! SIGINT everywhere; SIGTERM and SIGQUIT on Unix.

use fetchd_core::scheduler::ShutdownHandle;
use tokio::task::JoinHandle;

/// Spawns a task that waits for the first stop signal and requests shutdown.
pub fn spawn_signal_listener(shutdown: ShutdownHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let name = wait_for_signal().await;
        tracing::info!("received {}", name);
        eprintln!("fetchd: received {}, finishing in-flight batches", name);
        shutdown.request_shutdown();
    })
}

/// Ctrl-C; never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut term, mut quit) = match (signal(SignalKind::terminate()), signal(SignalKind::quit())) {
        (Ok(term), Ok(quit)) => (term, quit),
        _ => {
            tracing::warn!("could not install SIGTERM/SIGQUIT handlers; Ctrl-C only");
            ctrl_c().await;
            return "SIGINT";
        }
    };
    tokio::select! {
        _ = ctrl_c() => "SIGINT",
        _ = term.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    ctrl_c().await;
    "Ctrl-C"
}
