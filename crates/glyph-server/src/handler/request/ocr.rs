use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use glyph_core::{ImageUpload, ProcessingOptions, ValidationError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON body of the process endpoint.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ProcessImageRequest {
    /// Base64-encoded image, optionally as a `data:` URL.
    #[validate(length(min = 1))]
    pub image: String,
    /// Original filename, used for MIME inference and echoed back.
    #[serde(default)]
    #[validate(length(max = 255))]
    pub filename: Option<String>,
    /// Declared MIME type; inferred from the data URL or filename when absent.
    #[serde(default)]
    #[validate(length(max = 127))]
    pub mime_type: Option<String>,
    /// Language code, `auto` by default.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub language: Option<String>,
    /// Whether to include confidence scores, `true` by default.
    #[serde(default)]
    pub include_confidence: Option<bool>,
    /// Whether to include bounding boxes, `false` by default.
    #[serde(default)]
    pub include_bounding_boxes: Option<bool>,
}

impl ProcessImageRequest {
    /// Returns the requested options with defaults applied.
    pub fn options(&self) -> ProcessingOptions {
        UploadOptions {
            language: self.language.clone(),
            include_confidence: self.include_confidence,
            include_bounding_boxes: self.include_bounding_boxes,
        }
        .into_options(ProcessingOptions::default())
    }

    /// Decodes the image into an upload.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRequest`] when the image is not
    /// valid base64.
    pub fn into_upload(self) -> Result<ImageUpload, ValidationError> {
        let options = self.options();
        let (data_url_mime, payload) = split_data_url(&self.image);

        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(payload.as_bytes()).map_err(|err| {
            ValidationError::invalid_request(format!("Image is not valid base64: {err}"))
        })?;

        let mut upload =
            ImageUpload::new(bytes, self.filename.unwrap_or_default()).with_options(options);
        if let Some(mime_type) = self.mime_type.or(data_url_mime) {
            upload = upload.with_mime_type(mime_type);
        }

        Ok(upload)
    }
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and payload.
fn split_data_url(image: &str) -> (Option<String>, &str) {
    let Some(rest) = image.trim_start().strip_prefix("data:") else {
        return (None, image);
    };

    match rest.split_once(',') {
        Some((header, payload)) => {
            let mime = header
                .split(';')
                .next()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_owned);
            (mime, payload)
        }
        None => (None, image),
    }
}

/// Upload options, from the `options` JSON field or individual form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct UploadOptions {
    #[serde(default)]
    #[validate(length(max = 32))]
    pub language: Option<String>,
    #[serde(default)]
    pub include_confidence: Option<bool>,
    #[serde(default)]
    pub include_bounding_boxes: Option<bool>,
}

impl UploadOptions {
    /// Replaces the fields set in `fields`, keeping the rest.
    pub fn overlay(self, fields: Self) -> Self {
        Self {
            language: fields.language.or(self.language),
            include_confidence: fields.include_confidence.or(self.include_confidence),
            include_bounding_boxes: fields.include_bounding_boxes.or(self.include_bounding_boxes),
        }
    }

    /// Overlays the present fields on `base`.
    pub fn into_options(self, base: ProcessingOptions) -> ProcessingOptions {
        let mut options = base;
        if let Some(language) = self.language.filter(|l| !l.trim().is_empty()) {
            options = options.with_language(language.trim());
        }
        if let Some(include) = self.include_confidence {
            options = options.with_confidence(include);
        }
        if let Some(include) = self.include_bounding_boxes {
            options = options.with_bounding_boxes(include);
        }
        options
    }
}

/// Parses a form boolean: `true/false`, `1/0`, `yes/no` or `on/off`.
pub fn parse_flag(field: &str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ValidationError::invalid_request(format!(
            "Field '{field}' must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(image: &str) -> ProcessImageRequest {
        ProcessImageRequest {
            image: image.to_owned(),
            filename: None,
            mime_type: None,
            language: None,
            include_confidence: None,
            include_bounding_boxes: None,
        }
    }

    #[test]
    fn flags() {
        for value in ["true", "1", "YES", " on "] {
            assert!(parse_flag("f", value).unwrap());
        }
        for value in ["false", "0", "no", "Off"] {
            assert!(!parse_flag("f", value).unwrap());
        }
        assert!(matches!(
            parse_flag("include_confidence", "maybe"),
            Err(ValidationError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn defaults_apply() {
        let options = request("").options();
        assert_eq!(options, ProcessingOptions::default());
    }

    #[test]
    fn decodes_plain_base64() {
        let mut req = request("aGVs\nbG8=");
        req.filename = Some("a.png".to_owned());
        req.include_bounding_boxes = Some(true);

        let upload = req.into_upload().unwrap();
        assert_eq!(upload.bytes.as_ref(), b"hello");
        assert_eq!(upload.filename, "a.png");
        assert!(upload.mime_type.is_none());
        assert!(upload.options.include_bounding_boxes);
    }

    #[test]
    fn data_url_supplies_mime_type() {
        let upload = request("data:image/webp;base64,aGVsbG8=")
            .into_upload()
            .unwrap();
        assert_eq!(upload.mime_type.as_deref(), Some("image/webp"));
        assert_eq!(upload.bytes.as_ref(), b"hello");
    }

    #[test]
    fn declared_mime_type_beats_data_url() {
        let mut req = request("data:image/webp;base64,aGVsbG8=");
        req.mime_type = Some("image/png".to_owned());
        assert_eq!(req.into_upload().unwrap().mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let error = request("not base64!").into_upload().unwrap_err();
        assert!(matches!(error, ValidationError::InvalidRequest { .. }));
    }

    #[test]
    fn oversized_fields_fail_validation() {
        assert!(request("aGk=").validate().is_ok());

        let errors = request("").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image"));

        let mut req = request("aGk=");
        req.language = Some("x".repeat(33));
        req.filename = Some("f".repeat(256));
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("language"));
        assert!(errors.field_errors().contains_key("filename"));
    }

    #[test]
    fn form_fields_overlay_the_options_object() {
        let base: UploadOptions =
            serde_json::from_str(r#"{"language": "de", "include_bounding_boxes": true}"#).unwrap();
        let fields = UploadOptions {
            include_bounding_boxes: Some(false),
            ..UploadOptions::default()
        };

        let merged = base.overlay(fields);
        assert_eq!(merged.language.as_deref(), Some("de"));
        assert_eq!(merged.include_bounding_boxes, Some(false));
        assert_eq!(merged.include_confidence, None);

        let long = UploadOptions {
            language: Some("x".repeat(40)),
            ..UploadOptions::default()
        };
        assert!(long.validate().is_err());
    }

    #[test]
    fn blank_language_keeps_default() {
        let options = UploadOptions {
            language: Some("  ".to_owned()),
            ..UploadOptions::default()
        }
        .into_options(ProcessingOptions::default());
        assert_eq!(options.language, "auto");
    }
}
