//! CORS, hardening headers, compression and the request body ceiling.
//!
//! The body ceiling is derived from the upload ceiling: a legal upload must
//! always reach validation, which reports on it in the OCR envelope, rather
//! than being cut off by the transport.

use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{self, HeaderName, HeaderValue};
#[cfg(feature = "config")]
use clap::Args;
use glyph_core::validation::DEFAULT_MAX_UPLOAD_SIZE;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

/// Room for multipart boundaries, form fields and JSON keys.
const FORM_OVERHEAD: usize = 64 * 1024;

/// Body ceiling for the default upload ceiling.
pub const DEFAULT_MAX_BODY_SIZE: usize = body_limit_for_upload(DEFAULT_MAX_UPLOAD_SIZE);

/// Largest request body that can still carry an upload of `max_upload_size`
/// bytes, base64 expansion of the JSON endpoint included.
pub const fn body_limit_for_upload(max_upload_size: usize) -> usize {
    max_upload_size
        .saturating_add(2)
        .saturating_div(3)
        .saturating_mul(4)
        .saturating_add(FORM_OVERHEAD)
}

/// Scalar loads its bundle from jsDelivr, hence the CDN entries.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
    style-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
    img-src 'self' data:; \
    font-src 'self' data: https://cdn.jsdelivr.net; \
    connect-src 'self'; \
    frame-ancestors 'none'";

const RESPONSE_HEADERS: [(HeaderName, &str); 5] = [
    (header::X_FRAME_OPTIONS, "DENY"),
    (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (
        header::STRICT_TRANSPORT_SECURITY,
        "max-age=31536000; includeSubDomains",
    ),
    (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
];

/// Extension trait for `axum::`[`Router`] to apply security middleware.
pub trait RouterSecurityExt<S> {
    /// Bodies over `max_body_size` bytes are refused with 413.
    fn with_security(self, cors: &CorsConfig, max_body_size: usize) -> Self;
}

impl<S> RouterSecurityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_security(self, cors: &CorsConfig, max_body_size: usize) -> Self {
        let cors_layer = CorsLayer::new()
            .allow_origin(cors.to_header_values())
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(cors.allow_credentials)
            .max_age(cors.max_age());

        let router = self
            .layer(DefaultBodyLimit::max(max_body_size))
            .layer(RequestBodyLimitLayer::new(max_body_size))
            .layer(CompressionLayer::new())
            .layer(cors_layer);

        RESPONSE_HEADERS
            .into_iter()
            .fold(router, |router, (name, value)| {
                let value = HeaderValue::from_static(value);
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}

/// Which browser origins may call the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// Allowed origins, comma separated; local dev servers when empty.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ORIGINS", value_delimiter = ',')
    )]
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_MAX_AGE", default_value_t = 3600)
    )]
    pub max_age_seconds: u64,

    #[cfg_attr(
        feature = "config",
        arg(long, env = "CORS_ALLOW_CREDENTIALS", default_value_t = true)
    )]
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
            allow_credentials: true,
        }
    }
}

impl CorsConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Origins as header values; unparsable entries are skipped.
    pub fn to_header_values(&self) -> Vec<HeaderValue> {
        if self.allowed_origins.is_empty() {
            return [
                "http://localhost:3000",
                "http://localhost:5173",
                "http://localhost:8080",
                "http://127.0.0.1:3000",
            ]
            .into_iter()
            .map(HeaderValue::from_static)
            .collect();
        }

        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.trim().parse().ok())
            .collect()
    }
}
