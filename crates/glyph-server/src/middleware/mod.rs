//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Every concern is exposed as a router extension trait so the binary can
//! compose the stack in one expression:
//!
//! ```rust,ignore
//! let router = routes(None)
//!     .with_open_api(OpenApiConfig::default())
//!     .with_state(state)
//!     .with_metrics()
//!     .with_security(&cors, max_body_size)
//!     .with_observability()
//!     .with_recovery(&recovery);
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::{RouterObservabilityExt, track_categorized_metrics};
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{CorsConfig, DEFAULT_MAX_BODY_SIZE, RouterSecurityExt, body_limit_for_upload};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
