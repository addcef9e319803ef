//! Data model for a single recognition request and its results.

mod block;
mod detection;
mod options;
mod upload;

pub use block::{BoundingBox, ConfidenceLevel, DetectedTextBlock};
pub use detection::{RawDetection, RawDetections};
pub use options::{DEFAULT_LANGUAGE, ProcessingOptions};
pub use upload::{ImageUpload, RecognitionRequest};
