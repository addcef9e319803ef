//! Request extractors with structured rejections.
//!
//! Drop-in replacements for their `axum` counterparts whose rejections are
//! answered with the gateway's [`ErrorResponse`] body instead of plain text.
//!
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

mod json;
mod multipart;
mod validated_json;

pub use crate::extract::json::Json;
pub use crate::extract::multipart::Multipart;
pub use crate::extract::validated_json::{ValidateJson, describe_validation_errors};
