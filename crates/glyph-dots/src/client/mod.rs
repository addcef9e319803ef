//! HTTP client for the OCR inference service.

mod dots_client;
mod dots_config;

pub use dots_client::DotsClient;
pub use dots_config::{DEFAULT_BASE_URL, DEFAULT_MAX_RESPONSE_SIZE, DotsConfig};
