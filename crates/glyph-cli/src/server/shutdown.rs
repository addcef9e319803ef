//! Shutdown signal.

use std::future::{Future, pending};
use std::io;
use std::time::Duration;

use crate::TRACING_TARGET_SERVER_SHUTDOWN;

/// Resolves on the first of SIGINT or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires.
pub async fn shutdown_signal(drain_timeout: Duration) {
    let interrupt = wait_for("SIGINT", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        use tokio::signal::unix::{SignalKind, signal};
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), io::Error>(())
    });
    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }

    tracing::info!(
        target: TRACING_TARGET_SERVER_SHUTDOWN,
        drain_timeout_secs = drain_timeout.as_secs(),
        "Draining in-flight requests"
    );
}

async fn wait_for(name: &'static str, signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                signal = name,
                "Signal received"
            );
        }
        Err(error) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                signal = name,
                %error,
                "Cannot listen for signal"
            );
            pending::<()>().await;
        }
    }
}
