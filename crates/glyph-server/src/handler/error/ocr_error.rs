//! Status codes for OCR envelope failures.

use axum::http::StatusCode;
use glyph_core::ErrorKind;

/// Returns the HTTP status code used for a failed OCR envelope.
pub fn status_code(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::EmptyFile | ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorKind::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorKind::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ErrorKind::UnsupportedLanguage => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::UpstreamError => StatusCode::BAD_GATEWAY,
        ErrorKind::MalformedUpstreamResponse | ErrorKind::Configuration => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_client_errors() {
        for kind in [
            ErrorKind::EmptyFile,
            ErrorKind::FileTooLarge,
            ErrorKind::UnsupportedFormat,
            ErrorKind::UnsupportedLanguage,
            ErrorKind::InvalidRequest,
        ] {
            assert!(status_code(kind).is_client_error(), "{kind}");
        }
    }

    #[test]
    fn upstream_failures_are_server_errors() {
        assert_eq!(
            status_code(ErrorKind::UpstreamUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_code(ErrorKind::UpstreamError), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_code(ErrorKind::MalformedUpstreamResponse),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
