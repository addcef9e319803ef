use serde::{Deserialize, Serialize};

/// Language code that lets the OCR service detect the language itself.
pub const DEFAULT_LANGUAGE: &str = "auto";

/// Per-request processing flags.
///
/// Missing fields fall back to their defaults when deserialized, so callers
/// only send what they want to change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(default)]
pub struct ProcessingOptions {
    /// Language code for OCR (e.g. `en`), or `auto`.
    pub language: String,
    /// Include per-block confidence scores and levels.
    pub include_confidence: bool,
    /// Include per-block bounding boxes when the OCR service reports them.
    pub include_bounding_boxes: bool,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            include_confidence: true,
            include_bounding_boxes: false,
        }
    }
}

impl ProcessingOptions {
    /// Sets the language code.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets whether confidence scores are included.
    pub fn with_confidence(mut self, include: bool) -> Self {
        self.include_confidence = include;
        self
    }

    /// Sets whether bounding boxes are included.
    pub fn with_bounding_boxes(mut self, include: bool) -> Self {
        self.include_bounding_boxes = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ProcessingOptions::default();
        assert_eq!(options.language, "auto");
        assert!(options.include_confidence);
        assert!(!options.include_bounding_boxes);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let options: ProcessingOptions =
            serde_json::from_str(r#"{"include_bounding_boxes": true}"#).unwrap();

        assert_eq!(options.language, "auto");
        assert!(options.include_confidence);
        assert!(options.include_bounding_boxes);
    }
}
