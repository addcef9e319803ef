use glyph_core::ServiceStatus;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::service::StatsSnapshot;

/// Accepted formats, size ceiling and languages.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SupportedFormats {
    /// Allowed MIME types.
    pub supported_formats: Vec<String>,
    /// Upload ceiling in whole MiB.
    pub max_file_size_mb: usize,
    /// Upload ceiling in bytes.
    pub max_file_size_bytes: usize,
    /// Accepted language codes.
    pub supported_languages: Vec<String>,
}

/// Request counters and the status of the OCR service.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServiceStats {
    /// Gateway status.
    pub service_status: ServiceStatus,
    /// Last known status of the OCR service.
    pub ocr_service_status: ServiceStatus,
    /// Timestamp when the stats were produced.
    pub timestamp: Timestamp,
    /// Gateway version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
    /// Accumulated request counters.
    pub requests: StatsSnapshot,
    /// Map of the OCR endpoints.
    pub endpoints: Endpoints,
}

/// Paths of the OCR endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Endpoints {
    pub health: String,
    pub upload: String,
    pub process: String,
    pub supported_formats: String,
    pub stats: String,
}

impl Endpoints {
    /// Builds the endpoint map under the given prefix.
    pub fn under(prefix: &str) -> Self {
        Self {
            health: format!("{prefix}/health"),
            upload: format!("{prefix}/upload"),
            process: format!("{prefix}/process"),
            supported_formats: format!("{prefix}/supported-formats"),
            stats: format!("{prefix}/stats"),
        }
    }
}
