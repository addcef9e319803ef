//! Per-request sequencing: validate, recognize, normalize.

use std::time::{Duration, Instant};

use glyph_core::validation::sanitize_filename;
use glyph_core::{
    BoxedOcrProvider, Error, FormatValidator, ImageUpload, NormalizedText, Normalizer,
    ProcessingOptions, RawDetections, RecognitionRequest, Result,
};

use crate::TRACING_TARGET_ORCHESTRATOR;
use crate::service::StatsRecorder;

/// Retry policy for retryable OCR service failures.
///
/// Delays grow linearly: the n-th retry waits `n * backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first call.
    pub retries: u32,
    /// Base delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 0,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(retry)
    }
}

/// Everything known about one processed request.
#[derive(Debug)]
pub struct OcrReport {
    /// Sanitized filename.
    pub filename: String,
    /// Resolved MIME type, if resolution happened.
    pub mime_type: Option<String>,
    /// Upload size in bytes.
    pub file_size: usize,
    /// Options the request ran with.
    pub options: ProcessingOptions,
    /// Normalized text, or the failure that stopped processing.
    pub outcome: Result<NormalizedText>,
    /// Number of calls made to the OCR service.
    pub attempts: u32,
    /// Time from orchestration start to finish.
    pub elapsed: Duration,
}

impl OcrReport {
    /// Returns `true` when recognition completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Runs validation, the provider call and normalization for one upload.
///
/// The orchestrator never fails: every outcome, including validation and
/// upstream failures, is described by the returned [`OcrReport`]. With a
/// deadline set, the OCR service calls and their retries are cut off once
/// it passes and the request is reported as timed out.
#[derive(Clone)]
pub struct OcrOrchestrator {
    provider: BoxedOcrProvider,
    validator: FormatValidator,
    normalizer: Normalizer,
    retry: RetryPolicy,
    deadline: Option<Duration>,
    stats: StatsRecorder,
}

impl OcrOrchestrator {
    /// Creates an orchestrator around a provider.
    pub fn new(
        provider: BoxedOcrProvider,
        validator: FormatValidator,
        normalizer: Normalizer,
        stats: StatsRecorder,
    ) -> Self {
        Self {
            provider,
            validator,
            normalizer,
            retry: RetryPolicy::default(),
            deadline: None,
            stats,
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bounds the time from the start of [`process`] to the last OCR
    /// service answer.
    ///
    /// [`process`]: Self::process
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Processes one upload end to end.
    pub async fn process(&self, upload: ImageUpload) -> OcrReport {
        let started = Instant::now();
        let filename = sanitize_filename(&upload.filename);
        let file_size = upload.len();
        let options = upload.options.clone();

        let request = match self.validator.check(upload) {
            Ok(request) => request,
            Err(error) => {
                tracing::info!(
                    target: TRACING_TARGET_ORCHESTRATOR,
                    filename = %filename,
                    size = file_size,
                    error = %error,
                    "Upload rejected"
                );

                return self.finish(OcrReport {
                    filename,
                    mime_type: None,
                    file_size,
                    options,
                    outcome: Err(error.into()),
                    attempts: 0,
                    elapsed: started.elapsed(),
                });
            }
        };

        let mime_type = request.mime_type.clone();
        let options = request.options.clone();
        let mut attempts = 0;
        let outcome = match self.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_sub(started.elapsed());
                let recognition = self.recognize(request, &mut attempts);
                match tokio::time::timeout(remaining, recognition).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!(
                            target: TRACING_TARGET_ORCHESTRATOR,
                            filename = %filename,
                            deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                            "Processing deadline reached"
                        );
                        Err(Error::upstream_timeout("processing deadline reached"))
                    }
                }
            }
            None => self.recognize(request, &mut attempts).await,
        };
        let outcome = outcome.map(|raw| self.normalizer.normalize(raw, &options));

        self.finish(OcrReport {
            filename,
            mime_type: Some(mime_type),
            file_size,
            options,
            outcome,
            attempts,
            elapsed: started.elapsed(),
        })
    }

    /// Reports a request that could not be turned into an upload.
    ///
    /// Used for malformed requests such as a missing file part or an
    /// undecodable image, so they are answered and counted like any other.
    /// `started` is when the handler began reading the request.
    pub fn reject(
        &self,
        started: Instant,
        filename: Option<&str>,
        file_size: usize,
        options: ProcessingOptions,
        error: Error,
    ) -> OcrReport {
        tracing::info!(
            target: TRACING_TARGET_ORCHESTRATOR,
            error = %error,
            "Request rejected"
        );

        self.finish(OcrReport {
            filename: sanitize_filename(filename.unwrap_or_default()),
            mime_type: None,
            file_size,
            options,
            outcome: Err(error),
            attempts: 0,
            elapsed: started.elapsed(),
        })
    }

    /// Calls the provider, retrying retryable failures. `attempts` counts
    /// the calls made, even when the future is dropped mid-way.
    async fn recognize(
        &self,
        request: RecognitionRequest,
        attempts: &mut u32,
    ) -> Result<RawDetections> {
        let max_attempts = self.retry.retries.saturating_add(1);

        loop {
            *attempts += 1;
            let result = self.provider.recognize(request.clone()).await;
            match result {
                Err(error) if error.is_retryable() && *attempts < max_attempts => {
                    let delay = self.retry.delay(*attempts);
                    tracing::warn!(
                        target: TRACING_TARGET_ORCHESTRATOR,
                        attempt = *attempts,
                        max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %error,
                        "Retrying OCR service call"
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    fn finish(&self, report: OcrReport) -> OcrReport {
        match &report.outcome {
            Ok(normalized) => {
                self.stats.record_success(report.elapsed, report.attempts);
                tracing::info!(
                    target: TRACING_TARGET_ORCHESTRATOR,
                    filename = %report.filename,
                    blocks = normalized.len(),
                    attempts = report.attempts,
                    elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                    "OCR processing completed"
                );
            }
            Err(error) => {
                self.stats
                    .record_failure(error.kind(), report.elapsed, report.attempts);
                if !error.kind().is_validation() {
                    tracing::error!(
                        target: TRACING_TARGET_ORCHESTRATOR,
                        filename = %report.filename,
                        kind = error.kind().as_str(),
                        category = error.category(),
                        attempts = report.attempts,
                        error = %error,
                        "OCR processing failed"
                    );
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use glyph_core::{ConfidenceLevel, ErrorKind, ValidationConfig, ValidationError};
    use glyph_test::{MockOcrConfig, MockOcrProvider, MockOutcome};

    use super::*;

    fn orchestrator(mock: &MockOcrProvider) -> OcrOrchestrator {
        OcrOrchestrator::new(
            mock.boxed(),
            FormatValidator::new(ValidationConfig::default()),
            Normalizer::default(),
            StatsRecorder::new(),
        )
    }

    fn png(len: usize) -> ImageUpload {
        ImageUpload::new(vec![0x89u8; len], "scan.png").with_mime_type("image/png")
    }

    #[tokio::test]
    async fn small_png_with_one_confident_detection() {
        let mock = MockOcrProvider::default().with_outcome(MockOutcome::text("Hello", 0.92));
        let report = orchestrator(&mock).process(png(50)).await;

        let normalized = report.outcome.as_ref().unwrap();
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.blocks[0].confidence_level, Some(ConfidenceLevel::High));
        assert_eq!(normalized.full_text, "Hello");
        assert_eq!(report.attempts, 1);
        assert_eq!(report.mime_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn pdf_never_reaches_the_provider() {
        let mock = MockOcrProvider::default();
        let upload = ImageUpload::new(vec![1u8; 50], "doc.pdf").with_mime_type("application/pdf");
        let report = orchestrator(&mock).process(upload).await;

        let error = report.outcome.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnsupportedFormat);
        assert!(error.user_message().contains("application/pdf"));
        assert_eq!(report.attempts, 0);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn oversize_is_rejected_before_any_call() {
        let mock = MockOcrProvider::default();
        let orchestrator = OcrOrchestrator::new(
            mock.boxed(),
            FormatValidator::new(ValidationConfig::default().with_max_upload_size(10)),
            Normalizer::default(),
            StatsRecorder::new(),
        );

        let report = orchestrator.process(png(11)).await;
        assert_eq!(report.outcome.unwrap_err().kind(), ErrorKind::FileTooLarge);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn timeout_yields_generic_failure() {
        let mock = MockOcrProvider::default().with_outcome(MockOutcome::Timeout);
        let report = orchestrator(&mock).process(png(50)).await;

        let error = report.outcome.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UpstreamUnavailable);
        assert!(error.user_message().contains("did not respond in time"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn retries_recover_from_transient_failures() {
        let mock = MockOcrProvider::default()
            .with_outcome(MockOutcome::Unavailable)
            .with_outcome(MockOutcome::Status(503))
            .with_outcome(MockOutcome::text("ok", 0.6));

        let orchestrator = orchestrator(&mock).with_retry(RetryPolicy {
            retries: 2,
            backoff: Duration::from_millis(1),
        });

        let report = orchestrator.process(png(8)).await;
        assert!(report.is_success());
        assert_eq!(report.attempts, 3);
        assert_eq!(mock.calls(), 3);
        assert_eq!(orchestrator.stats.snapshot().upstream_retries, 2);
    }

    #[tokio::test]
    async fn non_retryable_failures_are_not_retried() {
        let mock = MockOcrProvider::default()
            .with_outcome(MockOutcome::Malformed)
            .with_outcome(MockOutcome::text("never", 0.9));

        let orchestrator = orchestrator(&mock).with_retry(RetryPolicy {
            retries: 3,
            backoff: Duration::from_millis(1),
        });

        let report = orchestrator.process(png(8)).await;
        assert_eq!(
            report.outcome.unwrap_err().kind(),
            ErrorKind::MalformedUpstreamResponse
        );
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn outcomes_are_recorded() {
        let mock = MockOcrProvider::default().with_outcome(MockOutcome::Status(500));
        let orchestrator = orchestrator(&mock);

        orchestrator.process(png(8)).await;
        orchestrator.process(png(8)).await;
        orchestrator.reject(
            Instant::now(),
            None,
            0,
            ProcessingOptions::default(),
            ValidationError::invalid_request("Missing file part").into(),
        );

        let snapshot = orchestrator.stats.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.upstream_failures, 1);
        assert_eq!(snapshot.validation_failures, 1);
    }

    #[tokio::test]
    async fn rejected_requests_get_a_default_filename() {
        let mock = MockOcrProvider::default();
        let report = orchestrator(&mock).reject(
            Instant::now(),
            None,
            0,
            ProcessingOptions::default(),
            ValidationError::invalid_request("bad").into(),
        );
        assert_eq!(report.filename, "upload");
    }

    #[tokio::test]
    async fn rejections_report_the_time_spent() {
        let mock = MockOcrProvider::default();
        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = orchestrator(&mock).reject(
            started,
            Some("a.png"),
            4,
            ProcessingOptions::default(),
            ValidationError::invalid_request("bad flag").into(),
        );
        assert!(report.elapsed >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn deadline_cuts_off_slow_retries() {
        let config = MockOcrConfig {
            mock_ocr_delay_ms: 700,
            ..MockOcrConfig::default()
        };
        let mock = MockOcrProvider::new(config)
            .with_outcome(MockOutcome::Timeout)
            .with_outcome(MockOutcome::Timeout);

        let orchestrator = orchestrator(&mock)
            .with_retry(RetryPolicy {
                retries: 1,
                backoff: Duration::from_millis(500),
            })
            .with_deadline(Duration::from_millis(900));

        let report = orchestrator.process(png(8)).await;
        assert!(report.elapsed < Duration::from_secs(1));
        assert_eq!(report.attempts, 1);

        let error = report.outcome.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UpstreamUnavailable);
        assert!(error.is_timeout());

        let snapshot = orchestrator.stats.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.upstream_failures, 1);
    }

    #[tokio::test]
    async fn deadline_leaves_fast_calls_alone() {
        let mock = MockOcrProvider::default().with_outcome(MockOutcome::text("quick", 0.9));
        let orchestrator = orchestrator(&mock).with_deadline(Duration::from_secs(5));

        let report = orchestrator.process(png(8)).await;
        assert!(report.is_success());
        assert_eq!(report.attempts, 1);
    }
}
