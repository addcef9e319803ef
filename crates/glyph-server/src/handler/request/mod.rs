//! Request types for HTTP handlers.

mod ocr;

pub use ocr::{ProcessImageRequest, UploadOptions, parse_flag};
