use glyph_core::{ServiceHealth, ServiceStatus};
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Liveness of the gateway process.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonitorStatus {
    /// Timestamp when the status was produced.
    pub checked_at: Timestamp,
    /// Always healthy while the process answers.
    pub status: ServiceStatus,
    /// Gateway version.
    pub version: String,
}

/// Health of the gateway together with the OCR service behind it.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcrHealth {
    /// Gateway status: degraded when the OCR service is not healthy.
    pub status: ServiceStatus,
    /// Timestamp when the status was produced.
    pub checked_at: Timestamp,
    /// Gateway version.
    pub version: String,
    /// Last known health report of the OCR service.
    pub ocr_service: ServiceHealth,
}
