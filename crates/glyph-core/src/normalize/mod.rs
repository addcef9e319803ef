//! Conversion of raw OCR detections into the public result shape.

mod config;

pub use config::{
    DEFAULT_CONFIDENCE, FULL_TEXT_SEPARATOR, HIGH_CONFIDENCE_THRESHOLD,
    MEDIUM_CONFIDENCE_THRESHOLD, NormalizerConfig,
};

use crate::TRACING_TARGET_NORMALIZE;
use crate::types::{ConfidenceLevel, DetectedTextBlock, ProcessingOptions, RawDetections};

/// Normalized output of one recognition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedText {
    /// Detected blocks in upstream order.
    pub blocks: Vec<DetectedTextBlock>,
    /// Block texts joined by the configured separator.
    pub full_text: String,
}

impl NormalizedText {
    /// Returns the number of blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if no text was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Turns [`RawDetections`] into [`DetectedTextBlock`]s.
///
/// Detections without text are dropped. Everything else keeps its upstream
/// order, so `full_text` always equals the block texts joined by the
/// separator.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalizes one response.
    pub fn normalize(&self, raw: RawDetections, options: &ProcessingOptions) -> NormalizedText {
        let received = raw.len();
        let blocks: Vec<DetectedTextBlock> = raw
            .into_iter()
            .filter_map(|detection| {
                let text = detection.text.filter(|t| !t.is_empty())?;
                let score = self.clamp_score(detection.confidence);

                let (confidence, confidence_level) = if options.include_confidence {
                    (Some(score), Some(self.classify(score)))
                } else {
                    (None, None)
                };

                let bounding_box = detection
                    .bounding_box
                    .filter(|_| options.include_bounding_boxes);

                Some(DetectedTextBlock {
                    text,
                    confidence,
                    confidence_level,
                    bounding_box,
                })
            })
            .collect();

        let full_text = blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(self.config.separator());

        if blocks.len() < received {
            tracing::debug!(
                target: TRACING_TARGET_NORMALIZE,
                received,
                kept = blocks.len(),
                "Dropped detections without text"
            );
        }

        NormalizedText { blocks, full_text }
    }

    /// Buckets a score using the configured thresholds.
    #[must_use]
    pub fn classify(&self, score: f64) -> ConfidenceLevel {
        ConfidenceLevel::classify(
            score,
            self.config.medium_threshold(),
            self.config.high_threshold(),
        )
    }

    fn clamp_score(&self, score: Option<f64>) -> f64 {
        match score {
            Some(score) if !score.is_nan() => score.clamp(0.0, 1.0),
            _ => self.config.default_confidence(),
        }
    }
}
