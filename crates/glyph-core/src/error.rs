//! Error taxonomy shared by every gateway component.
//!
//! Validation failures are described by [`ValidationError`] and are always the
//! caller's fault. Everything that can go wrong while talking to the external
//! OCR service is a variant of [`Error`] itself. Each failure maps to a stable
//! [`ErrorKind`] that is safe to expose as a machine-readable error code.

use strum::{AsRefStr, Display, IntoStaticStr};

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias with [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Stable, machine-readable classification of every gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The uploaded file has zero bytes.
    EmptyFile,
    /// The uploaded file exceeds the configured size ceiling.
    FileTooLarge,
    /// The MIME type is not on the allow-list.
    UnsupportedFormat,
    /// The requested language is not supported.
    UnsupportedLanguage,
    /// The request itself is malformed (missing file, bad encoding).
    InvalidRequest,
    /// The OCR service could not be reached or did not answer in time.
    UpstreamUnavailable,
    /// The OCR service answered with a failure.
    UpstreamError,
    /// The OCR service answered with something that could not be decoded.
    MalformedUpstreamResponse,
    /// The gateway itself is misconfigured.
    Configuration,
}

impl ErrorKind {
    /// Returns the error code as a static string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns `true` for failures caused by the caller's input.
    #[must_use]
    pub const fn is_validation(self) -> bool {
        matches!(
            self,
            Self::EmptyFile
                | Self::FileTooLarge
                | Self::UnsupportedFormat
                | Self::UnsupportedLanguage
                | Self::InvalidRequest
        )
    }
}

/// Rejection of an upload before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Zero-length upload.
    #[error("Empty file provided")]
    EmptyFile,

    /// Upload larger than the configured ceiling.
    #[error("File too large: {size} bytes exceeds the maximum of {max_size} bytes")]
    FileTooLarge {
        /// Size of the upload in bytes.
        size: usize,
        /// Configured maximum in bytes.
        max_size: usize,
    },

    /// MIME type outside the allow-list.
    #[error("Unsupported file format: {mime_type}. Supported formats: {}", supported.join(", "))]
    UnsupportedFormat {
        /// The (resolved) MIME type of the upload.
        mime_type: String,
        /// The configured allow-list.
        supported: Vec<String>,
    },

    /// Language code outside the supported set.
    #[error("Unsupported language: {language}. Supported languages: {}", supported.join(", "))]
    UnsupportedLanguage {
        /// The requested language code.
        language: String,
        /// The configured language list.
        supported: Vec<String>,
    },

    /// Structurally invalid request.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What is wrong with the request.
        message: String,
    },
}

impl ValidationError {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Returns the stable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyFile => ErrorKind::EmptyFile,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::UnsupportedLanguage { .. } => ErrorKind::UnsupportedLanguage,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }
}

/// Gateway error covering validation and the upstream failure taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The upload was rejected before contacting the OCR service.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Connection refused, DNS failure or timeout.
    #[error("OCR service unavailable: {message}")]
    UpstreamUnavailable {
        /// Transport-level description, never shown to callers.
        message: String,
        /// Whether the failure was a timeout.
        timed_out: bool,
    },

    /// The OCR service answered with a non-success status or a failure body.
    #[error("OCR service error (status {status}): {message}")]
    UpstreamError {
        /// HTTP status returned by the OCR service.
        status: u16,
        /// Upstream description, never shown to callers.
        message: String,
    },

    /// The OCR service answered with a body that could not be decoded.
    #[error("Malformed OCR service response: {message}")]
    MalformedResponse {
        /// What could not be decoded.
        message: String,
        /// Raw response body for debugging.
        body: Option<String>,
    },

    /// Invalid gateway configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

impl Error {
    /// Creates an upstream unavailable error.
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates an upstream unavailable error caused by a timeout.
    pub fn upstream_timeout(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Creates an upstream error.
    pub fn upstream_error(status: u16, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            status,
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed_response(message: impl Into<String>, body: Option<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            body,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Returns the stable error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(err) => err.kind(),
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::UpstreamError { .. } => ErrorKind::UpstreamError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedUpstreamResponse,
            Self::Config { .. } => ErrorKind::Configuration,
        }
    }

    /// Returns `true` for the timeout flavour of [`Error::UpstreamUnavailable`].
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { timed_out: true, .. })
    }

    /// Check if this error indicates a temporary failure that might succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamUnavailable { .. } => true,
            Self::UpstreamError { status, .. } => matches!(*status, 429 | 500..=599),
            Self::Validation(_) | Self::MalformedResponse { .. } | Self::Config { .. } => false,
        }
    }

    /// Get the error category for metrics/logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UpstreamUnavailable { .. } | Self::UpstreamError { .. } => "upstream",
            Self::MalformedResponse { .. } | Self::Config { .. } => "internal",
        }
    }

    /// Returns a message that is safe to show to API callers.
    ///
    /// Validation messages describe the caller's own input. Upstream failures
    /// collapse to generic text so internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::UpstreamUnavailable {
                timed_out: true, ..
            } => "OCR service did not respond in time. Please try again later.".to_owned(),
            Self::UpstreamUnavailable { .. } => {
                "OCR service is currently unavailable. Please try again later.".to_owned()
            }
            Self::UpstreamError { .. } => "OCR service failed to process the image.".to_owned(),
            Self::MalformedResponse { .. } => {
                "OCR service returned an unexpected response.".to_owned()
            }
            Self::Config { .. } => "OCR gateway is not configured correctly.".to_owned(),
        }
    }
}
