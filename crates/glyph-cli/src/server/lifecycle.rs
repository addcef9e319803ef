//! Startup and exit logging around the serving future.

use std::future::Future;
use std::io;
use std::time::Instant;

use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Awaits `serve_fn`, reporting readiness and, on exit, uptime or the
/// failure with its code and a hint.
pub async fn serve_with_shutdown<F>(
    server_config: &ServerConfig,
    serve_fn: impl FnOnce() -> F,
) -> ServerResult<()>
where
    F: Future<Output = io::Result<()>>,
{
    let started = Instant::now();

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Listening on every interface; uploads are accepted from any host"
        );
    }
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_config.server_addr(),
        "Gateway ready"
    );

    let result = serve_fn().await.map_err(ServerError::Runtime);
    let uptime_secs = started.elapsed().as_secs();

    if let Err(error) = &result {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            %error,
            error_code = error.error_code(),
            recoverable = error.is_recoverable(),
            suggestion = error.suggestion(),
            uptime_secs,
            "Gateway stopped with an error"
        );
    } else {
        tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, uptime_secs, "Gateway stopped");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clean_exit_is_ok() {
        let config = ServerConfig::default();
        let result = serve_with_shutdown(&config, || async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn io_failures_become_runtime_errors() {
        let config = ServerConfig::default();
        let result =
            serve_with_shutdown(&config, || async { Err(io::Error::other("listener died")) }).await;

        let error = result.unwrap_err();
        assert!(matches!(error, ServerError::Runtime(_)));
        assert_eq!(error.error_code(), "E002");
    }
}
