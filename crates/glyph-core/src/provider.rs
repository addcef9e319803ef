//! The seam between the gateway and the external OCR service.

use std::sync::Arc;

use crate::{RawDetections, RecognitionRequest, Result, ServiceHealth};

/// Type alias for a shared, dynamically dispatched OCR provider.
pub type BoxedOcrProvider = Arc<dyn OcrProvider + Send + Sync>;

/// An external service that turns image bytes into raw text detections.
///
/// Implementations perform exactly one outbound call per invocation and map
/// transport failures onto [`Error`] variants. Retrying is the caller's
/// decision.
///
/// [`Error`]: crate::Error
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    /// Runs recognition on a validated image.
    async fn recognize(&self, request: RecognitionRequest) -> Result<RawDetections>;

    /// Checks that the external service is reachable.
    async fn health_check(&self) -> Result<ServiceHealth>;
}
