use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_REQUEST;

/// Body of failures answered before an OCR handler runs, such as malformed
/// bodies, unknown routes and timeouts.
#[must_use = "error responses do nothing unless serialized"]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse<'a> {
    /// Stable snake_case identifier.
    pub name: Cow<'a, str>,
    /// Text safe to show to the caller.
    pub message: Cow<'a, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Cow<'a, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Cow<'a, str>>,

    #[serde(skip, default = "internal_error")]
    pub status: StatusCode,
}

fn internal_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Joins `extra` onto `existing` with `separator`.
fn merge<'a>(
    existing: Option<Cow<'a, str>>,
    extra: Cow<'a, str>,
    separator: &str,
) -> Cow<'a, str> {
    match existing {
        Some(existing) => Cow::Owned(format!("{existing}{separator}{extra}")),
        None => extra,
    }
}

impl<'a> ErrorResponse<'a> {
    pub const fn new(name: &'a str, message: &'a str, status: StatusCode) -> Self {
        Self {
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
            context: None,
            suggestion: None,
            status,
        }
    }

    /// Appends a sentence to the message.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        let base = self.message.trim_end_matches('.').to_owned();
        self.message = Cow::Owned(format!("{base}. {}", message.into()));
        self
    }

    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.context = Some(merge(self.context.take(), context.into(), "; "));
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<Cow<'a, str>>) -> Self {
        self.suggestion = Some(merge(self.suggestion.take(), suggestion.into(), "; "));
        self
    }
}

impl IntoResponse for ErrorResponse<'_> {
    fn into_response(self) -> Response {
        tracing::warn!(
            target: TRACING_TARGET_REQUEST,
            status = self.status.as_u16(),
            name = %self.name,
            context = ?self.context,
            "Request rejected"
        );
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAD_REQUEST: ErrorResponse<'static> =
        ErrorResponse::new("bad_request", "Bad request.", StatusCode::BAD_REQUEST);

    #[test]
    fn message_gets_a_second_sentence() {
        let response = BAD_REQUEST.with_message("Missing file part");
        assert_eq!(response.message, "Bad request. Missing file part");
    }

    #[test]
    fn context_and_suggestion_accumulate() {
        let response = BAD_REQUEST
            .with_context("first")
            .with_context("second")
            .with_suggestion("retry");
        assert_eq!(response.context.as_deref(), Some("first; second"));
        assert_eq!(response.suggestion.as_deref(), Some("retry"));
    }

    #[test]
    fn status_stays_out_of_the_body() {
        let json = serde_json::to_value(BAD_REQUEST).unwrap();
        assert_eq!(json["name"], "bad_request");
        assert!(json.get("status").is_none());
        assert!(json.get("context").is_none());
    }
}
