use serde::{Deserialize, Serialize};

/// Bounding box coordinates for detected text, in image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct BoundingBox {
    /// X coordinate of the top-left corner.
    pub x: f64,
    /// Y coordinate of the top-left corner.
    pub y: f64,
    /// Width of the box.
    pub width: f64,
    /// Height of the box.
    pub height: f64,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Coarse confidence bucket for a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Below the medium threshold.
    Low,
    /// At or above the medium threshold, below the high threshold.
    Medium,
    /// At or above the high threshold.
    High,
}

impl ConfidenceLevel {
    /// Buckets a score using the given thresholds.
    ///
    /// Requires `medium <= high`. Every input maps to exactly one level and a
    /// higher score never yields a lower level.
    #[must_use]
    pub fn classify(score: f64, medium: f64, high: f64) -> Self {
        if score >= high {
            Self::High
        } else if score >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns the level as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A normalized text detection as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct DetectedTextBlock {
    /// Extracted text content.
    pub text: String,
    /// Confidence score in `[0, 1]`, omitted when confidence was not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Confidence bucket, omitted when confidence was not requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<ConfidenceLevel>,
    /// Location of the text, present only when requested and reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(ConfidenceLevel::classify(0.0, 0.5, 0.8), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::classify(0.49, 0.5, 0.8), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::classify(0.5, 0.5, 0.8), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::classify(0.79, 0.5, 0.8), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::classify(0.8, 0.5, 0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::classify(1.0, 0.5, 0.8), ConfidenceLevel::High);
    }

    #[test]
    fn block_omits_absent_fields() {
        let block = DetectedTextBlock {
            text: "hello".to_owned(),
            confidence: None,
            confidence_level: None,
            bounding_box: None,
        };

        let json = serde_json::to_string(&block).unwrap();
        assert_eq!(json, r#"{"text":"hello"}"#);
    }
}
