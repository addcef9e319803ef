//! Errors raised while wiring the gateway together.
//!
//! Per-request failures never surface here; handlers answer those with an
//! [`OcrResponse`] envelope or an [`ErrorResponse`].
//!
//! [`OcrResponse`]: crate::handler::response::OcrResponse
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

use std::borrow::Cow;
use std::error::Error as StdError;

use strum::{Display, IntoStaticStr};

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which part of the startup went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Limits, thresholds or retry policy are inconsistent.
    Config,
    /// The OCR service adapter could not be set up.
    Upstream,
    Internal,
}

/// Startup error with an optional cause.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn upstream(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Upstream, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<glyph_core::Error> for Error {
    fn from(err: glyph_core::Error) -> Self {
        let message = err.to_string();
        let error = match err.kind() {
            glyph_core::ErrorKind::Configuration => Self::config(message),
            kind if kind.is_validation() => Self::internal(message),
            _ => Self::upstream(message),
        };
        error.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_kind() {
        let error = Error::config("retries above ceiling");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.to_string(), "config: retries above ceiling");
    }

    #[test]
    fn core_errors_are_classified_and_kept_as_source() {
        let error = Error::from(glyph_core::Error::config("thresholds out of order"));
        assert_eq!(error.kind(), ErrorKind::Config);
        assert!(StdError::source(&error).is_some());

        let error = Error::from(glyph_core::Error::upstream_unavailable("refused"));
        assert_eq!(error.kind(), ErrorKind::Upstream);
        let name: &'static str = error.kind().into();
        assert_eq!(name, "upstream");
    }
}
