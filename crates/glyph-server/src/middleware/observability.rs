//! Request IDs, trace spans and per-request metrics.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Router;
use axum::extract::{ConnectInfo, Request};
use axum::http::header;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::TRACING_TARGET_METRICS;
use crate::utility::RouteCategory;

const REQUEST_ID: &str = "x-request-id";

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Tags each request with an `x-request-id`, echoed on the response,
    /// and traces it with credentials redacted.
    fn with_observability(self) -> Self;

    /// See [`track_categorized_metrics`].
    fn with_metrics(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID),
        ))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID),
            MakeRequestUuid,
        ))
    }

    fn with_metrics(self) -> Self {
        self.layer(from_fn(track_categorized_metrics))
    }
}

/// Logs method, route category, status and latency of every request.
///
/// The peer address comes from [`ConnectInfo`] when the server provides it.
pub async fn track_categorized_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let category = RouteCategory::from_uri(request.uri());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let request_bytes = content_length(request.headers());

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if status.is_server_error() {
        tracing::warn!(
            target: TRACING_TARGET_METRICS,
            %method, %path, category = category.as_str(), status = status.as_u16(),
            elapsed_ms, peer = ?peer, request_bytes,
            "Request failed"
        );
    } else {
        tracing::debug!(
            target: TRACING_TARGET_METRICS,
            %method, %path, category = category.as_str(), status = status.as_u16(),
            elapsed_ms, peer = ?peer, request_bytes,
            response_bytes = content_length(response.headers()),
            "Request completed"
        );
    }

    response
}

fn content_length(headers: &header::HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
