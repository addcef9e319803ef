use crate::{Error, Result};

/// Scores at or above this are at least [`Medium`].
///
/// [`Medium`]: crate::ConfidenceLevel::Medium
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Scores at or above this are [`High`].
///
/// [`High`]: crate::ConfidenceLevel::High
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.8;

/// Joins block texts into `full_text`.
pub const FULL_TEXT_SEPARATOR: &str = "\n";

/// Score assumed when the OCR service reports none.
pub const DEFAULT_CONFIDENCE: f64 = 0.9;

/// Thresholds and formatting for result normalization.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "config does nothing unless you use it"]
pub struct NormalizerConfig {
    medium_threshold: f64,
    high_threshold: f64,
    separator: String,
    default_confidence: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            medium_threshold: MEDIUM_CONFIDENCE_THRESHOLD,
            high_threshold: HIGH_CONFIDENCE_THRESHOLD,
            separator: FULL_TEXT_SEPARATOR.to_owned(),
            default_confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl NormalizerConfig {
    /// Returns the medium threshold.
    #[must_use]
    pub fn medium_threshold(&self) -> f64 {
        self.medium_threshold
    }

    /// Returns the high threshold.
    #[must_use]
    pub fn high_threshold(&self) -> f64 {
        self.high_threshold
    }

    /// Returns the `full_text` separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Returns the score assumed for detections without one.
    #[must_use]
    pub fn default_confidence(&self) -> f64 {
        self.default_confidence
    }

    /// Sets both confidence thresholds.
    pub fn with_thresholds(mut self, medium: f64, high: f64) -> Self {
        self.medium_threshold = medium;
        self.high_threshold = high;
        self
    }

    /// Sets the `full_text` separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the score assumed for detections without one.
    pub fn with_default_confidence(mut self, confidence: f64) -> Self {
        self.default_confidence = confidence;
        self
    }

    /// Requires `0 <= medium <= high <= 1` and a default score in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);

        if !in_range(self.medium_threshold) || !in_range(self.high_threshold) {
            return Err(Error::config("Confidence thresholds must be within [0, 1]"));
        }

        if self.medium_threshold > self.high_threshold {
            return Err(Error::config(format!(
                "Medium confidence threshold ({}) must not exceed the high threshold ({})",
                self.medium_threshold, self.high_threshold
            )));
        }

        if !in_range(self.default_confidence) {
            return Err(Error::config("Default confidence must be within [0, 1]"));
        }

        Ok(())
    }
}
