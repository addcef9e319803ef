//! Request deadline and panic catching.
//!
//! Whatever goes wrong below this layer, the client still receives an
//! [`ErrorResponse`] body: 504 once `REQUEST_TIMEOUT` elapses, 500 for a
//! panicking handler or any other tower error.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

use std::any::Any;
use std::future::ready;
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::response::{IntoResponse, Response};
#[cfg(feature = "config")]
use clap::Args;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handler::ErrorKind;
use crate::{TRACING_TARGET_RECOVERY_ERROR, TRACING_TARGET_RECOVERY_PANIC};

/// Deadline for a whole request, upload and OCR call included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct RecoveryConfig {
    /// Seconds before an unfinished request is answered with 504.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "REQUEST_TIMEOUT", default_value_t = 60)
    )]
    pub request_timeout: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            request_timeout: 60,
        }
    }
}

impl RecoveryConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

/// Extension trait for `axum::`[`Router`] to apply recovery middleware.
pub trait RouterRecoveryExt<S> {
    fn with_recovery(self, config: &RecoveryConfig) -> Self;
}

impl<S> RouterRecoveryExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_recovery(self, config: &RecoveryConfig) -> Self {
        let middlewares = ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CatchPanicLayer::custom(catch_panic))
            .layer(TimeoutLayer::new(config.request_timeout()));

        self.layer(middlewares)
    }
}

fn handle_error(err: tower::BoxError) -> BoxFuture<'static, Response> {
    let response = if err.is::<Elapsed>() {
        tracing::warn!(target: TRACING_TARGET_RECOVERY_ERROR, "Request deadline exceeded");
        ErrorKind::GatewayTimeout
            .with_context("Processing was aborted after the request deadline")
            .into_response()
    } else {
        tracing::error!(target: TRACING_TARGET_RECOVERY_ERROR, error = %err, "Middleware failed");
        ErrorKind::InternalServerError.into_response()
    };

    ready(response).boxed()
}

fn catch_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    // The payload is logged, never returned.
    tracing::error!(target: TRACING_TARGET_RECOVERY_PANIC, panic = message, "Handler panicked");
    ErrorKind::InternalServerError.into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "late"
    }

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn deadline_gives_gateway_timeout() -> anyhow::Result<()> {
        let config = RecoveryConfig { request_timeout: 0 };
        let router: Router = Router::new().route("/slow", get(slow)).with_recovery(&config);
        let server = TestServer::new(router)?;

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.json::<serde_json::Value>()["name"], "gateway_timeout");
        Ok(())
    }

    #[tokio::test]
    async fn panic_message_is_not_leaked() -> anyhow::Result<()> {
        let router: Router = Router::new()
            .route("/boom", get(boom))
            .with_recovery(&RecoveryConfig::default());
        let server = TestServer::new(router)?;

        let response = server.get("/boom").await;
        response.assert_status_internal_server_error();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "internal_server_error");
        assert!(!body.to_string().contains("exploded"));
        Ok(())
    }
}
