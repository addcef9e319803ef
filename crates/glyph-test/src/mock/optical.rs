//! Mock OCR provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use glyph_core::{
    BoundingBox, BoxedOcrProvider, Error, OcrProvider, RawDetection, RawDetections,
    RecognitionRequest, Result, ServiceHealth,
};
use serde::{Deserialize, Serialize};

/// Configuration for the mock OCR provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct MockOcrConfig {
    /// Text returned when no outcome is scripted.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-ocr-text", env = "MOCK_OCR_TEXT", default_value = "Sample text")
    )]
    pub mock_ocr_text: String,

    /// Confidence reported with the default text.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-ocr-confidence", env = "MOCK_OCR_CONFIDENCE", default_value_t = 0.95)
    )]
    pub mock_ocr_confidence: f64,

    /// Artificial latency added to every recognition, in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(long = "mock-ocr-delay-ms", env = "MOCK_OCR_DELAY_MS", default_value_t = 0)
    )]
    pub mock_ocr_delay_ms: u64,
}

impl Default for MockOcrConfig {
    fn default() -> Self {
        Self {
            mock_ocr_text: "Sample text".to_owned(),
            mock_ocr_confidence: 0.95,
            mock_ocr_delay_ms: 0,
        }
    }
}

/// One scripted answer of [`MockOcrProvider`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Recognition succeeds with these detections.
    Detections(RawDetections),
    /// The service cannot be reached.
    Unavailable,
    /// The service does not answer in time.
    Timeout,
    /// The service answers with this non-success status.
    Status(u16),
    /// The service answers with an undecodable body.
    Malformed,
}

impl MockOutcome {
    /// A single detection with the given text and score.
    pub fn text(text: impl Into<String>, confidence: f64) -> Self {
        Self::Detections(RawDetections::from(vec![
            RawDetection::new(text).with_confidence(confidence),
        ]))
    }

    /// A single detection with a bounding box.
    pub fn text_with_box(text: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self::Detections(RawDetections::from(vec![
            RawDetection::new(text)
                .with_confidence(confidence)
                .with_bounding_box(bbox),
        ]))
    }

    fn into_result(self) -> Result<RawDetections> {
        match self {
            Self::Detections(detections) => Ok(detections),
            Self::Unavailable => Err(Error::upstream_unavailable("mock: connection refused")),
            Self::Timeout => Err(Error::upstream_timeout("mock: operation timed out")),
            Self::Status(status) => Err(Error::upstream_error(status, "mock: scripted failure")),
            Self::Malformed => Err(Error::malformed_response(
                "mock: body is not JSON",
                Some("<html></html>".to_owned()),
            )),
        }
    }
}

/// Mock OCR provider for testing.
///
/// Scripted outcomes are consumed in order; once the script runs out every
/// call answers with the configured default text. Clones share the script,
/// the counters and the recorded request.
#[derive(Debug, Clone, Default)]
pub struct MockOcrProvider {
    config: MockOcrConfig,
    script: Arc<Mutex<VecDeque<MockOutcome>>>,
    health: Arc<Mutex<Option<ServiceHealth>>>,
    last_request: Arc<Mutex<Option<RecognitionRequest>>>,
    calls: Arc<AtomicUsize>,
    health_checks: Arc<AtomicUsize>,
}

impl MockOcrProvider {
    /// Creates a new mock OCR provider with the given configuration.
    pub fn new(config: MockOcrConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Appends an outcome to the script.
    #[must_use]
    pub fn with_outcome(self, outcome: MockOutcome) -> Self {
        self.push_outcome(outcome);
        self
    }

    /// Sets the report returned by health checks.
    #[must_use]
    pub fn with_health(self, health: ServiceHealth) -> Self {
        *lock(&self.health) = Some(health);
        self
    }

    /// Appends an outcome to the script of an already shared mock.
    pub fn push_outcome(&self, outcome: MockOutcome) {
        lock(&self.script).push_back(outcome);
    }

    /// Number of recognition calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of health checks received.
    pub fn health_checks(&self) -> usize {
        self.health_checks.load(Ordering::SeqCst)
    }

    /// The most recent recognition request, if any.
    pub fn last_request(&self) -> Option<RecognitionRequest> {
        lock(&self.last_request).clone()
    }

    /// Wraps a clone of this mock as a shared provider.
    pub fn boxed(&self) -> BoxedOcrProvider {
        Arc::new(self.clone())
    }

    fn default_detections(&self) -> RawDetections {
        RawDetections::from(vec![
            RawDetection::new(self.config.mock_ocr_text.clone())
                .with_confidence(self.config.mock_ocr_confidence),
        ])
    }
}

#[async_trait::async_trait]
impl OcrProvider for MockOcrProvider {
    async fn recognize(&self, request: RecognitionRequest) -> Result<RawDetections> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *lock(&self.last_request) = Some(request);

        if self.config.mock_ocr_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.mock_ocr_delay_ms)).await;
        }

        let scripted = lock(&self.script).pop_front();
        match scripted {
            Some(outcome) => outcome.into_result(),
            None => Ok(self.default_detections()),
        }
    }

    async fn health_check(&self) -> Result<ServiceHealth> {
        self.health_checks.fetch_add(1, Ordering::SeqCst);
        let health = lock(&self.health).clone();
        Ok(health.unwrap_or_else(ServiceHealth::healthy))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use glyph_core::{ErrorKind, ImageUpload, ServiceStatus, ValidationConfig};

    use super::*;

    fn request() -> RecognitionRequest {
        glyph_core::FormatValidator::new(ValidationConfig::default())
            .check(ImageUpload::new(vec![1u8; 4], "a.png"))
            .unwrap()
    }

    #[tokio::test]
    async fn scripted_outcomes_run_in_order() {
        let mock = MockOcrProvider::default()
            .with_outcome(MockOutcome::text("first", 0.9))
            .with_outcome(MockOutcome::Timeout);

        let first = mock.recognize(request()).await.unwrap();
        assert_eq!(first.iter().next().unwrap().text.as_deref(), Some("first"));

        let err = mock.recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(err.is_timeout());

        let fallback = mock.recognize(request()).await.unwrap();
        assert_eq!(
            fallback.iter().next().unwrap().text.as_deref(),
            Some("Sample text")
        );
        assert_eq!(mock.calls(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockOcrProvider::default();
        let provider = mock.boxed();

        mock.push_outcome(MockOutcome::Status(500));
        let err = provider.recognize(request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamError);

        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_request().unwrap().filename, "a.png");
    }

    #[tokio::test]
    async fn health_is_configurable() {
        let mock = MockOcrProvider::default();
        assert!(mock.health_check().await.unwrap().is_healthy());

        let mock = mock.with_health(ServiceHealth::unhealthy("down"));
        let health = mock.health_check().await.unwrap();
        assert_eq!(health.status, ServiceStatus::Unhealthy);
        assert_eq!(mock.health_checks(), 2);
    }
}
