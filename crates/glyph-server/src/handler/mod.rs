//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod monitors;
mod ocr;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result, status_code};
pub use crate::handler::ocr::OCR_PREFIX;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes.
///
/// Additional routes, if any, are merged before the fallback is installed.
pub fn routes(additional_routes: Option<ApiRouter<ServiceState>>) -> ApiRouter<ServiceState> {
    let mut router = ApiRouter::new()
        .merge(monitors::routes())
        .merge(ocr::routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router.fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use aide::axum::ApiRouter;
    use axum_test::TestServer;
    use glyph_test::MockOcrProvider;

    use crate::handler::{OCR_PREFIX, routes};
    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a new [`TestServer`] with the given router and a default mock.
    pub fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let mock = MockOcrProvider::default();
        let state = ServiceState::from_config(&ServiceConfig::default(), mock.boxed())?;
        let router = router(state.clone());
        create_test_server_with_state(router, state)
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let server = TestServer::new(axum::Router::from(app))?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with every route, backed by `mock`.
    pub fn create_test_server(
        config: &ServiceConfig,
        mock: &MockOcrProvider,
    ) -> anyhow::Result<TestServer> {
        let state = ServiceState::from_config(config, mock.boxed())?;
        create_test_server_with_state(routes(None), state)
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() -> anyhow::Result<()> {
        let server = create_test_server(&ServiceConfig::default(), &MockOcrProvider::default())?;

        let response = server.get("/nope").await;
        response.assert_status_not_found();

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }

    #[tokio::test]
    async fn counters_are_served_by_stats_only() -> anyhow::Result<()> {
        let server = create_test_server(&ServiceConfig::default(), &MockOcrProvider::default())?;

        server.get("/metrics").await.assert_status_not_found();

        let response = server.get(&format!("{OCR_PREFIX}/stats")).await;
        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert!(body["requests"]["total_requests"].is_u64());
        Ok(())
    }
}
