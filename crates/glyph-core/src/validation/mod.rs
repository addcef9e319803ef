//! Upload validation.
//!
//! [`FormatValidator`] runs every check that does not need the OCR service:
//! emptiness, size ceiling, MIME allow-list and language support. A
//! successful [`FormatValidator::check`] yields a [`RecognitionRequest`].

mod config;
mod filename;

use std::sync::Arc;

pub use config::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_SUPPORTED_LANGUAGES,
    ValidationConfig,
};
pub use filename::{DEFAULT_FILENAME, sanitize_filename};

use crate::types::{ImageUpload, RecognitionRequest};
use crate::{TRACING_TARGET_VALIDATION, ValidationError};

const OCTET_STREAM: &str = "application/octet-stream";

/// Stateless validator over a shared [`ValidationConfig`].
#[derive(Debug, Clone, Default)]
pub struct FormatValidator {
    config: Arc<ValidationConfig>,
}

impl FormatValidator {
    /// Creates a validator with the given limits.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the active limits.
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Checks size and format of an upload.
    ///
    /// Checks run in a fixed order: empty, size, then format. Parameters such
    /// as `; charset=binary` are ignored and comparison is case-insensitive.
    pub fn validate(&self, mime_type: &str, len: usize) -> Result<(), ValidationError> {
        if len == 0 {
            tracing::debug!(target: TRACING_TARGET_VALIDATION, "Rejected empty upload");
            return Err(ValidationError::EmptyFile);
        }

        let max_size = self.config.max_upload_size();
        if len > max_size {
            tracing::debug!(
                target: TRACING_TARGET_VALIDATION,
                size = len,
                max_size,
                "Rejected oversized upload"
            );
            return Err(ValidationError::FileTooLarge {
                size: len,
                max_size,
            });
        }

        let essence = mime_essence(mime_type);
        if !self.is_allowed(&essence) {
            tracing::debug!(
                target: TRACING_TARGET_VALIDATION,
                mime_type = %essence,
                "Rejected unsupported format"
            );
            return Err(ValidationError::UnsupportedFormat {
                mime_type: essence,
                supported: self.config.allowed_mime_types().to_vec(),
            });
        }

        Ok(())
    }

    /// Checks a language code and returns it normalized to lowercase.
    pub fn validate_language(&self, language: &str) -> Result<String, ValidationError> {
        let normalized = language.trim().to_ascii_lowercase();
        if self.config.supported_languages().contains(&normalized) {
            return Ok(normalized);
        }

        tracing::debug!(
            target: TRACING_TARGET_VALIDATION,
            language = %language,
            "Rejected unsupported language"
        );

        Err(ValidationError::UnsupportedLanguage {
            language: language.to_owned(),
            supported: self.config.supported_languages().to_vec(),
        })
    }

    /// Picks the MIME type to validate against.
    ///
    /// The declared type wins unless it is missing, blank or the generic
    /// `application/octet-stream`, in which case the type is guessed from the
    /// filename extension.
    #[must_use]
    pub fn resolve_mime_type(&self, declared: Option<&str>, filename: &str) -> String {
        let declared = declared
            .map(mime_essence)
            .filter(|m| !m.is_empty() && m != OCTET_STREAM);

        if let Some(declared) = declared {
            return declared;
        }

        mime_guess::from_path(filename)
            .first()
            .map(|m| m.essence_str().to_ascii_lowercase())
            .unwrap_or_else(|| OCTET_STREAM.to_owned())
    }

    /// Runs every check on an upload and produces a request for the provider.
    pub fn check(&self, upload: ImageUpload) -> Result<RecognitionRequest, ValidationError> {
        let ImageUpload {
            bytes,
            filename,
            mime_type,
            mut options,
        } = upload;

        let filename = sanitize_filename(&filename);
        let mime_type = self.resolve_mime_type(mime_type.as_deref(), &filename);

        self.validate(&mime_type, bytes.len())?;
        options.language = self.validate_language(&options.language)?;

        tracing::trace!(
            target: TRACING_TARGET_VALIDATION,
            filename = %filename,
            mime_type = %mime_type,
            size = bytes.len(),
            language = %options.language,
            "Upload accepted"
        );

        Ok(RecognitionRequest {
            bytes,
            filename,
            mime_type,
            options,
        })
    }

    fn is_allowed(&self, essence: &str) -> bool {
        self.config
            .allowed_mime_types()
            .iter()
            .any(|allowed| allowed == essence)
    }
}

/// Lowercased `type/subtype` with parameters removed.
fn mime_essence(value: &str) -> String {
    let value = value.trim();
    match value.parse::<mime::Mime>() {
        Ok(parsed) => parsed.essence_str().to_ascii_lowercase(),
        Err(_) => value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessingOptions;
    use crate::{Error, ErrorKind};

    fn validator() -> FormatValidator {
        FormatValidator::new(ValidationConfig::default().with_max_upload_size(1024))
    }

    #[test]
    fn empty_file_is_checked_first() {
        let err = validator().validate("application/pdf", 0).unwrap_err();
        assert_eq!(err, ValidationError::EmptyFile);
    }

    #[test]
    fn size_is_checked_before_format() {
        let err = validator().validate("application/pdf", 2048).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileTooLarge);
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        assert!(validator().validate("image/png", 1024).is_ok());
        assert!(validator().validate("image/png", 1025).is_err());
    }

    #[test]
    fn format_check_ignores_case_and_parameters() {
        let v = validator();
        assert!(v.validate("IMAGE/PNG", 10).is_ok());
        assert!(v.validate("image/jpeg; charset=binary", 10).is_ok());
        assert!(v.validate("image/jpg", 10).is_ok());

        let err = v.validate("application/pdf", 10).unwrap_err();
        match err {
            ValidationError::UnsupportedFormat {
                mime_type,
                supported,
            } => {
                assert_eq!(mime_type, "application/pdf");
                assert!(supported.contains(&"image/png".to_owned()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn languages_are_case_insensitive() {
        let v = validator();
        assert_eq!(v.validate_language("EN").unwrap(), "en");
        assert_eq!(v.validate_language("auto").unwrap(), "auto");

        let err = v.validate_language("xx").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedLanguage);
    }

    #[test]
    fn resolves_mime_from_extension_when_generic() {
        let v = validator();
        assert_eq!(v.resolve_mime_type(None, "scan.png"), "image/png");
        assert_eq!(
            v.resolve_mime_type(Some("application/octet-stream"), "scan.jpg"),
            "image/jpeg"
        );
        assert_eq!(v.resolve_mime_type(Some(""), "scan.webp"), "image/webp");
        assert_eq!(v.resolve_mime_type(None, "scan"), OCTET_STREAM);
    }

    #[test]
    fn declared_mime_wins_over_extension() {
        let v = validator();
        assert_eq!(
            v.resolve_mime_type(Some("application/pdf"), "scan.png"),
            "application/pdf"
        );
    }

    #[test]
    fn check_produces_request() {
        let upload = ImageUpload::new(vec![1u8, 2, 3], "../receipts/march.PNG")
            .with_options(ProcessingOptions::default().with_language("EN"));

        let request = validator().check(upload).unwrap();
        assert_eq!(request.filename, "march.PNG");
        assert_eq!(request.mime_type, "image/png");
        assert_eq!(request.options.language, "en");
        assert_eq!(request.len(), 3);
    }

    #[test]
    fn check_rejects_before_language() {
        let upload = ImageUpload::new(Vec::<u8>::new(), "a.png")
            .with_options(ProcessingOptions::default().with_language("xx"));

        let err: Error = validator().check(upload).unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::EmptyFile);
    }
}
