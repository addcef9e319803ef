//! The OCR response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use glyph_core::DetectedTextBlock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::handler::error::status_code;
use crate::service::OcrReport;

/// Message of every successful envelope.
const SUCCESS_MESSAGE: &str = "OCR processing completed successfully";

/// Response envelope shared by every OCR endpoint, successful or not.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OcrResponse {
    /// Whether recognition completed.
    pub success: bool,
    /// Human-readable outcome, safe to display.
    pub message: String,
    /// Sanitized name of the uploaded file.
    pub filename: String,
    /// Detected text blocks in reading order.
    pub detected_text: Vec<DetectedTextBlock>,
    /// All block texts joined by the configured separator.
    pub full_text: String,
    /// Processing details.
    pub metadata: OcrMetadata,
    /// Wall-clock time spent on the request, in milliseconds.
    pub processing_time_ms: f64,
    /// Stable machine-readable error code, present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// HTTP status code (not serialized in JSON)
    #[serde(skip, default = "default_status")]
    #[schemars(skip)]
    pub status: StatusCode,
}

fn default_status() -> StatusCode {
    StatusCode::OK
}

/// Processing details attached to every envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OcrMetadata {
    /// Language code used for recognition.
    pub language: String,
    /// Number of blocks in `detected_text`.
    pub text_blocks_count: usize,
    /// Size of the uploaded file in bytes.
    pub file_size: usize,
    /// Resolved MIME type, absent when the upload was rejected before resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Whether confidence scores were requested.
    pub include_confidence: bool,
    /// Whether bounding boxes were requested.
    pub include_bounding_boxes: bool,
    /// Number of calls made to the OCR service.
    pub upstream_attempts: u32,
}

impl From<OcrReport> for OcrResponse {
    fn from(report: OcrReport) -> Self {
        let processing_time_ms = report.elapsed.as_secs_f64() * 1000.0;
        let mut metadata = OcrMetadata {
            language: report.options.language.clone(),
            text_blocks_count: 0,
            file_size: report.file_size,
            mime_type: report.mime_type,
            include_confidence: report.options.include_confidence,
            include_bounding_boxes: report.options.include_bounding_boxes,
            upstream_attempts: report.attempts,
        };

        match report.outcome {
            Ok(normalized) => {
                metadata.text_blocks_count = normalized.len();
                Self {
                    success: true,
                    message: SUCCESS_MESSAGE.to_owned(),
                    filename: report.filename,
                    detected_text: normalized.blocks,
                    full_text: normalized.full_text,
                    metadata,
                    processing_time_ms,
                    error: None,
                    status: StatusCode::OK,
                }
            }
            Err(error) => Self {
                success: false,
                message: error.user_message(),
                filename: report.filename,
                detected_text: Vec::new(),
                full_text: String::new(),
                metadata,
                processing_time_ms,
                error: Some(error.kind().as_str().to_owned()),
                status: status_code(error.kind()),
            },
        }
    }
}

impl IntoResponse for OcrResponse {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self)).into_response()
    }
}

impl aide::OperationOutput for OcrResponse {
    type Inner = Self;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        axum::Json::<Self>::operation_response(ctx, operation)
    }
}
