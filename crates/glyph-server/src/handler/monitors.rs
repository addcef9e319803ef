//! Process liveness endpoint.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;
use glyph_core::ServiceStatus;
use jiff::Timestamp;

use crate::extract::Json;
use crate::handler::response::MonitorStatus;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "glyph_server::handler::monitors";

/// Answers as long as the process is able to serve requests.
///
/// Does not contact the OCR service; see the OCR health endpoint for that.
#[tracing::instrument(skip_all)]
async fn health_status() -> (StatusCode, Json<MonitorStatus>) {
    tracing::trace!(target: TRACING_TARGET, "Liveness check requested");

    let response = MonitorStatus {
        checked_at: Timestamp::now(),
        status: ServiceStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_owned(),
    };

    (StatusCode::OK, Json(response))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get process health")
        .description("Returns the gateway status, a timestamp and the version.")
        .response::<200, Json<MonitorStatus>>()
}

/// Returns routes for health monitoring.
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    async fn health_endpoint_answers() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let status = response.json::<MonitorStatus>();
        assert_eq!(status.status, ServiceStatus::Healthy);
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));

        let age = Timestamp::now().duration_since(status.checked_at);
        assert!(age.as_secs() < 60, "timestamp should be recent");

        Ok(())
    }
}
