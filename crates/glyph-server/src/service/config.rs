use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use glyph_core::{NormalizerConfig, ValidationConfig};
use serde::{Deserialize, Serialize};

use crate::service::{DEFAULT_CACHE_DURATION, Error, Result};

/// Upper bound on `UPSTREAM_RETRIES`.
const MAX_UPSTREAM_RETRIES: u32 = 10;

/// Upper bound on the share of the request deadline kept for the response.
const RESPONSE_MARGIN: Duration = Duration::from_secs(1);

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Additional attempts after a retryable OCR service failure.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "UPSTREAM_RETRIES", default_value_t = 0)
    )]
    pub upstream_retries: u32,

    /// Base delay between retries in milliseconds, multiplied by the attempt number.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "UPSTREAM_RETRY_BACKOFF_MS", default_value_t = 500)
    )]
    pub upstream_retry_backoff_ms: u64,

    /// How long an OCR service health report stays valid, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "HEALTH_CACHE_SECS", default_value_t = 30)
    )]
    pub health_cache_secs: u64,

    /// Upload limits.
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(skip)]
    pub validation: ValidationConfig,

    /// Confidence thresholds and the full text separator.
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(skip)]
    pub normalization: NormalizerConfig,

    /// Whole request deadline enforced by the recovery middleware.
    #[cfg_attr(feature = "config", arg(skip))]
    #[serde(skip)]
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upstream_retries: 0,
            upstream_retry_backoff_ms: 500,
            health_cache_secs: DEFAULT_CACHE_DURATION.as_secs(),
            validation: ValidationConfig::default(),
            normalization: NormalizerConfig::default(),
            request_timeout: None,
        }
    }
}

impl ServiceConfig {
    /// Replaces the upload limits.
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Replaces the normalization settings.
    pub fn with_normalization(mut self, normalization: NormalizerConfig) -> Self {
        self.normalization = normalization;
        self
    }

    /// Sets the retry policy.
    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.upstream_retries = retries;
        self.upstream_retry_backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the whole request deadline the processing deadline derives from.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Time allowed for OCR service calls and their retries.
    ///
    /// A tenth of the request deadline, at most one second, is left for the
    /// response so a timed out call still gets an OCR envelope.
    pub fn processing_deadline(&self) -> Option<Duration> {
        self.request_timeout
            .map(|timeout| timeout.saturating_sub((timeout / 10).min(RESPONSE_MARGIN)))
    }

    /// Longest time every attempt plus backoff can take when each call runs
    /// into `call_timeout`.
    pub fn worst_case_upstream(&self, call_timeout: Duration) -> Duration {
        let retries = self.upstream_retries;
        let backoff_steps = retries.saturating_mul(retries.saturating_add(1)) / 2;
        call_timeout
            .saturating_mul(retries.saturating_add(1))
            .saturating_add(self.retry_backoff().saturating_mul(backoff_steps))
    }

    /// Returns the base retry delay.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.upstream_retry_backoff_ms)
    }

    /// Returns the health report lifetime.
    pub fn health_cache_duration(&self) -> Duration {
        Duration::from_secs(self.health_cache_secs)
    }

    /// Validates all configuration values.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the retry count is above the
    /// ceiling or when the upload or normalization settings are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.upstream_retries > MAX_UPSTREAM_RETRIES {
            return Err(Error::config(format!(
                "Upstream retries must be at most {MAX_UPSTREAM_RETRIES}"
            )));
        }

        self.validation.validate()?;
        self.normalization.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_backoff(), Duration::from_millis(500));
        assert_eq!(config.health_cache_duration(), Duration::from_secs(30));
        assert_eq!(config.processing_deadline(), None);
    }

    #[test]
    fn processing_deadline_leaves_room_for_the_response() {
        let config = ServiceConfig::default().with_request_timeout(Duration::from_secs(60));
        assert_eq!(config.processing_deadline(), Some(Duration::from_secs(59)));

        let config = ServiceConfig::default().with_request_timeout(Duration::from_secs(1));
        assert_eq!(config.processing_deadline(), Some(Duration::from_millis(900)));

        let config = ServiceConfig::default().with_request_timeout(Duration::ZERO);
        assert_eq!(config.processing_deadline(), Some(Duration::ZERO));
    }

    #[test]
    fn worst_case_upstream_counts_every_attempt_and_backoff() {
        let call = Duration::from_secs(30);
        assert_eq!(ServiceConfig::default().worst_case_upstream(call), call);

        // 3 calls of 30s, then backoffs of 1s and 2s.
        let config = ServiceConfig::default().with_retries(2, Duration::from_secs(1));
        assert_eq!(config.worst_case_upstream(call), Duration::from_secs(93));
    }

    #[test]
    fn too_many_retries() {
        let config = ServiceConfig::default().with_retries(11, Duration::from_millis(1));
        let error = config.validate().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn nested_configs_are_validated() {
        let config = ServiceConfig::default()
            .with_normalization(NormalizerConfig::default().with_thresholds(0.9, 0.1));
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);

        let validation = ValidationConfig::default().with_max_upload_size(0);
        let config = ServiceConfig::default().with_validation(validation);
        assert!(config.validate().is_err());
    }
}
