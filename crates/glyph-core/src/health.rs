//! Health reporting for the external OCR service.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Coarse availability of the OCR service or the gateway.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Answering requests
    #[default]
    Healthy,
    /// Service is reachable but reports a problem
    Degraded,
    /// Not answering
    Unhealthy,
}

impl ServiceStatus {
    /// Returns the status as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Result of one availability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ServiceHealth {
    /// Outcome of the check
    pub status: ServiceStatus,
    /// Round-trip time of the health check in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Why the service is not healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the check ran
    pub checked_at: Timestamp,
}

impl ServiceHealth {
    fn new(status: ServiceStatus, message: Option<String>) -> Self {
        Self {
            status,
            response_time_ms: None,
            message,
            checked_at: Timestamp::now(),
        }
    }

    /// Check that found the service answering.
    pub fn healthy() -> Self {
        Self::new(ServiceStatus::Healthy, None)
    }

    /// Check that found the service slow or partially failing.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(ServiceStatus::Degraded, Some(message.into()))
    }

    /// Check that could not reach the service.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::new(ServiceStatus::Unhealthy, Some(message.into()))
    }

    /// Records how long the check took.
    pub fn with_response_time_ms(mut self, response_time_ms: u64) -> Self {
        self.response_time_ms = Some(response_time_ms);
        self
    }

    /// Returns `true` when the service is fully healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}
