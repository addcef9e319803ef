//! Flags for upload validation and result normalization.

use clap::Args;
use glyph_core::normalize::{
    DEFAULT_CONFIDENCE, HIGH_CONFIDENCE_THRESHOLD, MEDIUM_CONFIDENCE_THRESHOLD,
};
use glyph_core::validation::{
    DEFAULT_ALLOWED_MIME_TYPES, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_SUPPORTED_LANGUAGES,
};
use glyph_core::{NormalizerConfig, ValidationConfig};
use serde::{Deserialize, Serialize};

/// Upload limits.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ValidationArgs {
    /// Largest accepted upload in bytes.
    #[arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,

    /// Accepted MIME types, comma separated.
    #[arg(
        long,
        env = "ALLOWED_MIME_TYPES",
        value_delimiter = ',',
        default_values_t = owned(DEFAULT_ALLOWED_MIME_TYPES)
    )]
    pub allowed_mime_types: Vec<String>,

    /// Accepted language codes, comma separated.
    #[arg(
        long,
        env = "SUPPORTED_LANGUAGES",
        value_delimiter = ',',
        default_values_t = owned(DEFAULT_SUPPORTED_LANGUAGES)
    )]
    pub supported_languages: Vec<String>,
}

impl ValidationArgs {
    /// Builds the validator configuration.
    pub fn to_config(&self) -> ValidationConfig {
        ValidationConfig::default()
            .with_max_upload_size(self.max_upload_size)
            .with_allowed_mime_types(&self.allowed_mime_types)
            .with_supported_languages(&self.supported_languages)
    }
}

/// Result normalization.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct NormalizationArgs {
    /// Scores at or above this are reported as medium confidence.
    #[arg(
        long,
        env = "CONFIDENCE_MEDIUM_THRESHOLD",
        default_value_t = MEDIUM_CONFIDENCE_THRESHOLD
    )]
    pub confidence_medium_threshold: f64,

    /// Scores at or above this are reported as high confidence.
    #[arg(
        long,
        env = "CONFIDENCE_HIGH_THRESHOLD",
        default_value_t = HIGH_CONFIDENCE_THRESHOLD
    )]
    pub confidence_high_threshold: f64,

    /// Score assumed when the OCR service reports none.
    #[arg(long, env = "DEFAULT_CONFIDENCE", default_value_t = DEFAULT_CONFIDENCE)]
    pub default_confidence: f64,

    /// Separator placed between block texts in `full_text`.
    ///
    /// The escapes `\n` and `\t` are expanded.
    #[arg(
        long,
        env = "FULL_TEXT_SEPARATOR",
        default_value = "\\n",
        hide_default_value = true
    )]
    pub full_text_separator: String,
}

impl NormalizationArgs {
    /// Builds the normalizer configuration.
    pub fn to_config(&self) -> NormalizerConfig {
        NormalizerConfig::default()
            .with_thresholds(
                self.confidence_medium_threshold,
                self.confidence_high_threshold,
            )
            .with_default_confidence(self.default_confidence)
            .with_separator(unescape(&self.full_text_separator))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_owned()).collect()
}

/// Expands `\n` and `\t`, which are awkward to pass through a shell.
fn unescape(value: &str) -> String {
    value.replace("\\n", "\n").replace("\\t", "\t")
}
