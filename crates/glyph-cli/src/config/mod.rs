//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig             # Host, port, shutdown
//! ├── middleware: MiddlewareConfig     # CORS, OpenAPI, request timeout
//! ├── service: ServiceConfig           # Retries, health cache
//! ├── upstream: UpstreamConfig         # OCR service URL, timeout, API key
//! ├── validation: ValidationArgs       # Upload ceiling, MIME types, languages
//! ├── normalization: NormalizationArgs # Confidence thresholds, separator
//! └── telemetry: TelemetryConfig       # Log level and format
//! ```
//!
//! Every option can be given as a flag or an environment variable.

mod middleware;
mod pipeline;
mod provider;
mod server;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::Parser;
use glyph_server::service::ServiceConfig;
pub use middleware::MiddlewareConfig;
pub use pipeline::{NormalizationArgs, ValidationArgs};
pub use provider::{UpstreamConfig, create_ocr_provider};
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
pub use telemetry::TelemetryConfig;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "glyph")]
#[command(about = "HTTP gateway in front of an OCR inference service")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Retry and health cache configuration.
    #[clap(flatten)]
    pub service: ServiceConfig,

    /// OCR service connection.
    #[clap(flatten)]
    pub upstream: UpstreamConfig,

    /// Upload limits.
    #[clap(flatten)]
    pub validation: ValidationArgs,

    /// Result normalization.
    #[clap(flatten)]
    pub normalization: NormalizationArgs,

    /// Logging configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Mock OCR provider configuration.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock: glyph_test::MockOcrConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so its values
    /// act as environment defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Assembles the service configuration from its flag groups.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        let config = self
            .service
            .clone()
            .with_validation(self.validation.to_config())
            .with_normalization(self.normalization.to_config())
            .with_request_timeout(self.middleware.recovery.request_timeout());

        config
            .validate()
            .context("invalid service configuration")?;
        Ok(config)
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        self.middleware
            .validate()
            .context("invalid middleware configuration")?;
        self.upstream
            .validate()
            .context("invalid OCR service configuration")?;
        let service = self.service_config()?;

        if let Some(deadline) = service.processing_deadline() {
            let worst_case = service.worst_case_upstream(self.upstream.timeout());
            if worst_case >= deadline {
                tracing::warn!(
                    target: TRACING_TARGET_CONFIG,
                    worst_case_secs = worst_case.as_secs(),
                    deadline_secs = deadline.as_secs(),
                    "OCR calls with retries can outlast the request deadline; \
                     slow requests will be cut off and reported as upstream timeouts"
                );
            }
        }
        Ok(())
    }

    /// Logs configuration (no secrets).
    pub fn log(&self) {
        Self::log_build_info();
        self.server.log();
        self.middleware.log();
        self.upstream.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            upstream_retries = self.service.upstream_retries,
            upstream_retry_backoff_ms = self.service.upstream_retry_backoff_ms,
            health_cache_secs = self.service.health_cache_secs,
            max_upload_size = self.validation.max_upload_size,
            allowed_mime_types = ?self.validation.allowed_mime_types,
            supported_languages = ?self.validation.supported_languages,
            medium_threshold = self.normalization.confidence_medium_threshold,
            high_threshold = self.normalization.confidence_high_threshold,
            "Service configuration"
        );
    }

    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "mock").then_some("mock"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_are_valid() {
        let cli = Cli::try_parse_from(["glyph"]).unwrap();
        assert!(cli.validate().is_ok());

        let config = cli.service_config().unwrap();
        assert_eq!(config.validation.max_upload_size(), 10_485_760);
        assert_eq!(config.normalization.separator(), "\n");
    }

    #[test]
    fn flags_reach_the_service_config() {
        let cli = Cli::try_parse_from([
            "glyph",
            "--max-upload-size",
            "2048",
            "--supported-languages",
            "EN,de",
            "--confidence-high-threshold",
            "0.7",
            "--upstream-retries",
            "2",
        ])
        .unwrap();

        let config = cli.service_config().unwrap();
        assert_eq!(config.validation.max_upload_size(), 2048);
        assert_eq!(config.validation.supported_languages(), ["en", "de"]);
        assert_eq!(config.normalization.high_threshold(), 0.7);
        assert_eq!(config.upstream_retries, 2);
    }

    #[test]
    fn request_timeout_bounds_processing() {
        let cli = Cli::try_parse_from(["glyph", "--request-timeout", "20"]).unwrap();
        let config = cli.service_config().unwrap();
        assert_eq!(config.processing_deadline(), Some(Duration::from_secs(19)));
    }

    #[test]
    fn retries_past_the_deadline_are_still_valid() {
        let cli = Cli::try_parse_from([
            "glyph",
            "--upstream-retries",
            "2",
            "--request-timeout",
            "60",
        ])
        .unwrap();
        assert!(cli.validate().is_ok());

        let config = cli.service_config().unwrap();
        let worst_case = config.worst_case_upstream(cli.upstream.timeout());
        assert!(worst_case >= config.processing_deadline().unwrap());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let cli = Cli::try_parse_from([
            "glyph",
            "--confidence-medium-threshold",
            "0.9",
            "--confidence-high-threshold",
            "0.4",
        ])
        .unwrap();

        assert!(cli.validate().is_err());
    }
}
