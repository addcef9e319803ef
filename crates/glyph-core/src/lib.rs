#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for upload validation.
pub const TRACING_TARGET_VALIDATION: &str = "glyph_core::validation";

/// Tracing target for result normalization.
pub const TRACING_TARGET_NORMALIZE: &str = "glyph_core::normalize";

mod error;
mod health;
mod provider;

pub mod normalize;
pub mod types;
pub mod validation;

pub use error::{BoxedError, Error, ErrorKind, Result, ValidationError};
pub use health::{ServiceHealth, ServiceStatus};
pub use normalize::{NormalizedText, Normalizer, NormalizerConfig};
pub use provider::{BoxedOcrProvider, OcrProvider};
pub use types::{
    BoundingBox, ConfidenceLevel, DetectedTextBlock, ImageUpload, ProcessingOptions,
    RawDetection, RawDetections, RecognitionRequest,
};
pub use validation::{FormatValidator, ValidationConfig};
