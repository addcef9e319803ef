//! Application state and dependency injection.

mod config;
mod health_cache;
mod orchestrator;
mod stats;

use glyph_core::{BoxedOcrProvider, FormatValidator, Normalizer};

pub use crate::service::config::ServiceConfig;
pub use crate::service::health_cache::{DEFAULT_CACHE_DURATION, HealthCache};
pub use crate::service::orchestrator::{OcrOrchestrator, OcrReport, RetryPolicy};
pub use crate::service::stats::{StatsRecorder, StatsSnapshot};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    ocr_provider: BoxedOcrProvider,

    // Internal services:
    orchestrator: OcrOrchestrator,
    validator: FormatValidator,
    health_cache: HealthCache,
    stats: StatsRecorder,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// The OCR provider is built by the caller so that any implementation
    /// (the HTTP client, or a mock in tests) can be plugged in.
    pub fn from_config(config: &ServiceConfig, ocr_provider: BoxedOcrProvider) -> Result<Self> {
        config.validate()?;

        let validator = FormatValidator::new(config.validation.clone());
        let stats = StatsRecorder::new();
        let retry = RetryPolicy {
            retries: config.upstream_retries,
            backoff: config.retry_backoff(),
        };

        let mut orchestrator = OcrOrchestrator::new(
            ocr_provider.clone(),
            validator.clone(),
            Normalizer::new(config.normalization.clone()),
            stats.clone(),
        )
        .with_retry(retry);
        if let Some(deadline) = config.processing_deadline() {
            orchestrator = orchestrator.with_deadline(deadline);
        }

        Ok(Self {
            ocr_provider,
            orchestrator,
            validator,
            health_cache: HealthCache::with_cache_duration(config.health_cache_duration()),
            stats,
        })
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(ocr_provider: BoxedOcrProvider);

// Internal services:
impl_di!(orchestrator: OcrOrchestrator);
impl_di!(validator: FormatValidator);
impl_di!(health_cache: HealthCache);
impl_di!(stats: StatsRecorder);
