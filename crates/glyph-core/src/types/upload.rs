use bytes::Bytes;

use super::ProcessingOptions;

/// An image as received from the caller, before validation.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Caller-supplied filename.
    pub filename: String,
    /// Declared MIME type, if the caller sent one.
    pub mime_type: Option<String>,
    /// Processing flags.
    pub options: ProcessingOptions,
}

impl ImageUpload {
    /// Creates an upload with default options and no declared MIME type.
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type: None,
            options: ProcessingOptions::default(),
        }
    }

    /// Sets the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Sets the processing options.
    pub fn with_options(mut self, options: ProcessingOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the size of the upload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the upload has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A validated image ready to be sent to the OCR service.
///
/// Only [`FormatValidator::check`] produces these, so holding one means the
/// size, format and language checks have passed.
///
/// [`FormatValidator::check`]: crate::FormatValidator::check
#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    /// Raw image bytes.
    pub bytes: Bytes,
    /// Sanitized filename.
    pub filename: String,
    /// Resolved, allow-listed MIME type.
    pub mime_type: String,
    /// Processing flags with a normalized language code.
    pub options: ProcessingOptions,
}

impl RecognitionRequest {
    /// Returns the size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the image has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
