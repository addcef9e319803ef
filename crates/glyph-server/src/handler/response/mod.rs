//! Response types for HTTP handlers.

mod errors;
mod monitors;
mod ocr;
mod service_info;

pub use errors::ErrorResponse;
pub use monitors::{MonitorStatus, OcrHealth};
pub use ocr::{OcrMetadata, OcrResponse};
pub use service_info::{Endpoints, ServiceStats, SupportedFormats};
