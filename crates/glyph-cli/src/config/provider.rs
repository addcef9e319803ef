//! OCR service connection and provider construction.

use std::time::Duration;

use clap::Args;
use glyph_core::BoxedOcrProvider;
use glyph_dots::{DEFAULT_BASE_URL, DotsConfig};
use serde::{Deserialize, Serialize};

use super::Cli;
use crate::TRACING_TARGET_CONFIG;

/// Connection settings for the OCR service.
#[derive(Clone, Args, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the OCR service.
    #[arg(long, env = "OCR_SERVICE_URL", default_value = DEFAULT_BASE_URL)]
    pub ocr_service_url: String,

    /// Timeout for a single OCR service call, in seconds.
    #[arg(long, env = "OCR_SERVICE_TIMEOUT", default_value_t = 30)]
    pub ocr_service_timeout: u64,

    /// Bearer token sent to the OCR service.
    #[arg(long, env = "OCR_SERVICE_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub ocr_service_api_key: Option<String>,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("ocr_service_url", &self.ocr_service_url)
            .field("ocr_service_timeout", &self.ocr_service_timeout)
            .field(
                "ocr_service_api_key",
                &self.ocr_service_api_key.as_ref().map(|_| "****"),
            )
            .finish()
    }
}

impl UpstreamConfig {
    /// Returns the call timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_service_timeout)
    }

    /// Builds the client configuration.
    pub fn to_dots_config(&self) -> anyhow::Result<DotsConfig> {
        let mut config = DotsConfig::new(&self.ocr_service_url)?.with_timeout(self.timeout());
        if let Some(api_key) = &self.ocr_service_api_key {
            config = config.with_api_key(api_key.clone());
        }
        Ok(config)
    }

    /// Validates the URL and timeout.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ocr_service_timeout == 0 || self.ocr_service_timeout > 600 {
            anyhow::bail!(
                "OCR service timeout {} seconds is invalid. Must be between 1 and 600 seconds.",
                self.ocr_service_timeout
            );
        }

        self.to_dots_config()?;
        Ok(())
    }

    /// Logs the connection settings without the API key.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            url = %self.ocr_service_url,
            timeout_secs = self.ocr_service_timeout,
            api_key_set = self.ocr_service_api_key.is_some(),
            "OCR service configuration"
        );
    }
}

/// Creates the OCR provider from CLI configuration.
///
/// With the `mock` feature the canned provider is used and the OCR service
/// is never contacted.
#[cfg(not(feature = "mock"))]
pub fn create_ocr_provider(cli: &Cli) -> anyhow::Result<BoxedOcrProvider> {
    use anyhow::Context;
    use glyph_dots::DotsClient;

    let config = cli.upstream.to_dots_config()?;
    let client = DotsClient::new(config).context("failed to create OCR service client")?;
    Ok(std::sync::Arc::new(client))
}

/// Creates the OCR provider from CLI configuration.
#[cfg(feature = "mock")]
pub fn create_ocr_provider(cli: &Cli) -> anyhow::Result<BoxedOcrProvider> {
    tracing::warn!(
        target: TRACING_TARGET_CONFIG,
        "Serving canned OCR results; the OCR service is not contacted"
    );
    Ok(glyph_test::MockOcrProvider::new(cli.mock.clone()).boxed())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream(url: &str) -> UpstreamConfig {
        UpstreamConfig {
            ocr_service_url: url.to_owned(),
            ocr_service_timeout: 30,
            ocr_service_api_key: Some("secret".to_owned()),
        }
    }

    #[test]
    fn validates_the_url() {
        assert!(upstream("http://dots:8000").validate().is_ok());
        assert!(upstream("ftp://dots").validate().is_err());
        assert!(upstream("not a url").validate().is_err());
    }

    #[test]
    fn api_key_is_not_printed() {
        let printed = format!("{:?}", upstream("http://dots:8000"));
        assert!(!printed.contains("secret"));
    }
}
