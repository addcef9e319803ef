//! Lock-free request accounting.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use glyph_core::ErrorKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
struct Counters {
    started_at: Instant,
    total: AtomicU64,
    succeeded: AtomicU64,
    validation_failures: AtomicU64,
    upstream_failures: AtomicU64,
    upstream_retries: AtomicU64,
    processing_micros: AtomicU64,
}

/// Accumulates per-request outcomes.
///
/// Clones share the same counters. Every update is a single relaxed atomic
/// add, so recording never blocks a request.
#[derive(Debug, Clone)]
pub struct StatsRecorder {
    counters: Arc<Counters>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatsSnapshot {
    /// Requests that reached an OCR endpoint.
    pub total_requests: u64,
    /// Requests that produced a successful envelope.
    pub successful_requests: u64,
    /// Requests that produced a failed envelope.
    pub failed_requests: u64,
    /// Failures caused by the uploaded file or options.
    pub validation_failures: u64,
    /// Failures caused by the OCR service.
    pub upstream_failures: u64,
    /// Additional calls made to the OCR service after a retryable failure.
    pub upstream_retries: u64,
    /// Mean processing time over all requests, in milliseconds.
    pub average_processing_time_ms: f64,
}

impl StatsRecorder {
    /// Creates a recorder with zeroed counters; uptime starts now.
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Counters {
                started_at: Instant::now(),
                total: AtomicU64::new(0),
                succeeded: AtomicU64::new(0),
                validation_failures: AtomicU64::new(0),
                upstream_failures: AtomicU64::new(0),
                upstream_retries: AtomicU64::new(0),
                processing_micros: AtomicU64::new(0),
            }),
        }
    }

    /// Records a successful request.
    pub fn record_success(&self, elapsed: Duration, attempts: u32) {
        self.record(elapsed, attempts);
        self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed request.
    pub fn record_failure(&self, kind: ErrorKind, elapsed: Duration, attempts: u32) {
        self.record(elapsed, attempts);
        let counter = if kind.is_validation() {
            &self.counters.validation_failures
        } else {
            &self.counters.upstream_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record(&self, elapsed: Duration, attempts: u32) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        self.counters
            .processing_micros
            .fetch_add(micros, Ordering::Relaxed);
        self.counters
            .upstream_retries
            .fetch_add(u64::from(attempts.saturating_sub(1)), Ordering::Relaxed);
    }

    /// Time since the recorder was created.
    pub fn uptime(&self) -> Duration {
        self.counters.started_at.elapsed()
    }

    /// Returns a copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let total = self.counters.total.load(Ordering::Relaxed);
        let succeeded = self.counters.succeeded.load(Ordering::Relaxed);
        let micros = self.counters.processing_micros.load(Ordering::Relaxed);

        let average_processing_time_ms = if total == 0 {
            0.0
        } else {
            micros as f64 / total as f64 / 1000.0
        };

        StatsSnapshot {
            total_requests: total,
            successful_requests: succeeded,
            failed_requests: total.saturating_sub(succeeded),
            validation_failures: self.counters.validation_failures.load(Ordering::Relaxed),
            upstream_failures: self.counters.upstream_failures.load(Ordering::Relaxed),
            upstream_retries: self.counters.upstream_retries.load(Ordering::Relaxed),
            average_processing_time_ms,
        }
    }
}

impl Default for StatsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recorder() {
        let snapshot = StatsRecorder::new().snapshot();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn outcomes_are_counted_by_category() {
        let stats = StatsRecorder::new();
        stats.record_success(Duration::from_millis(10), 1);
        stats.record_failure(ErrorKind::UnsupportedFormat, Duration::from_millis(2), 0);
        stats.record_failure(ErrorKind::UpstreamUnavailable, Duration::from_millis(30), 3);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 2);
        assert_eq!(snapshot.validation_failures, 1);
        assert_eq!(snapshot.upstream_failures, 1);
        assert_eq!(snapshot.upstream_retries, 2);
        assert!((snapshot.average_processing_time_ms - 14.0).abs() < 1e-9);
    }

    #[test]
    fn clones_share_counters() {
        let stats = StatsRecorder::new();
        let clone = stats.clone();
        clone.record_success(Duration::from_millis(1), 1);
        assert_eq!(stats.snapshot().successful_requests, 1);
    }
}
