//! Log targets, one per area, so `RUST_LOG` can select them individually.

/// Validation, OCR service calls and normalization of a single request.
pub const TRACING_TARGET_ORCHESTRATOR: &str = "glyph_server::orchestrator";

/// Requests rejected before reaching an OCR handler.
pub const TRACING_TARGET_REQUEST: &str = "glyph_server::request";

/// Per-request latency and status.
pub const TRACING_TARGET_METRICS: &str = "glyph_server::metrics";

pub const TRACING_TARGET_RECOVERY_ERROR: &str = "glyph_server::recovery::error";

pub const TRACING_TARGET_RECOVERY_PANIC: &str = "glyph_server::recovery::panic";

/// OCR service availability checks.
pub const TRACING_TARGET_HEALTH_CACHE: &str = "glyph_server::health_cache";
