//! OCR service health with simple caching.
//!
//! Health checks are network calls, so the last report is kept for a
//! configurable duration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glyph_core::{OcrProvider, ServiceHealth};
use tokio::sync::RwLock;

use crate::TRACING_TARGET_HEALTH_CACHE;

/// Default cache duration for health checks.
pub const DEFAULT_CACHE_DURATION: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct HealthCacheEntry {
    report: RwLock<Option<(Instant, ServiceHealth)>>,
    cache_duration: Duration,
}

/// Caches the health report of the OCR service.
///
/// Clones share the same cache.
#[derive(Debug, Clone)]
pub struct HealthCache {
    cache: Arc<HealthCacheEntry>,
}

impl HealthCache {
    /// Creates a cache with a custom duration. Zero disables caching.
    pub fn with_cache_duration(cache_duration: Duration) -> Self {
        tracing::info!(
            target: TRACING_TARGET_HEALTH_CACHE,
            cache_duration_secs = cache_duration.as_secs(),
            "health cache initialized"
        );

        Self {
            cache: Arc::new(HealthCacheEntry {
                report: RwLock::new(None),
                cache_duration,
            }),
        }
    }

    /// Returns the cached report or asks the provider when it has expired.
    ///
    /// A failing check is turned into an unhealthy report; the underlying
    /// error is logged and never returned.
    pub async fn get_or_update<P>(&self, provider: &P) -> ServiceHealth
    where
        P: OcrProvider + ?Sized,
    {
        {
            let report = self.cache.report.read().await;
            if let Some((checked, health)) = report.as_ref()
                && checked.elapsed() < self.cache.cache_duration
            {
                return health.clone();
            }
        }

        let health = match provider.health_check().await {
            Ok(health) => health,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_HEALTH_CACHE,
                    error = %error,
                    "OCR service health check failed"
                );
                ServiceHealth::unhealthy(error.user_message())
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_HEALTH_CACHE,
            status = health.status.as_str(),
            response_time_ms = ?health.response_time_ms,
            "OCR service health refreshed"
        );

        *self.cache.report.write().await = Some((Instant::now(), health.clone()));

        health
    }
}

#[cfg(test)]
mod tests {
    use glyph_core::ServiceStatus;
    use glyph_test::MockOcrProvider;

    use super::*;

    #[tokio::test]
    async fn reports_are_cached() {
        let mock = MockOcrProvider::default();
        let cache = HealthCache::with_cache_duration(Duration::from_secs(60));

        let health = cache.get_or_update(&mock).await;
        assert!(health.is_healthy());

        cache.get_or_update(&mock).await;
        assert_eq!(mock.health_checks(), 1);
    }

    #[tokio::test]
    async fn clones_share_the_report() {
        let mock = MockOcrProvider::default();
        let cache = HealthCache::with_cache_duration(DEFAULT_CACHE_DURATION);

        cache.clone().get_or_update(&mock).await;
        cache.get_or_update(&mock).await;
        assert_eq!(mock.health_checks(), 1);
    }

    #[tokio::test]
    async fn zero_duration_disables_caching() {
        let mock = MockOcrProvider::default().with_health(ServiceHealth::degraded("slow"));
        let cache = HealthCache::with_cache_duration(Duration::ZERO);

        let health = cache.get_or_update(&mock).await;
        assert_eq!(health.status, ServiceStatus::Degraded);

        cache.get_or_update(&mock).await;
        assert_eq!(mock.health_checks(), 2);
    }
}
