// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request a graceful shutdown: the accept
// loop stops and in-flight connections are drained.

use tracing::{info, warn};

/// Resolve when the process is asked to stop
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to register SIGTERM handler, only Ctrl+C will stop the server");
            let _ = tokio::signal::ctrl_c().await;
            info!(signal = "SIGINT", "shutdown requested");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!(signal = "SIGINT", "shutdown requested"),
        _ = sigterm.recv() => info!(signal = "SIGTERM", "shutdown requested"),
    }
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!(signal = "ctrl-c", "shutdown requested");
}
