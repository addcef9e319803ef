use serde::{Deserialize, Serialize};

use super::BoundingBox;

/// One detection exactly as the OCR service reported it.
///
/// Every field is optional because the upstream payload is a loosely
/// versioned dependency. [`Normalizer`] decides what to do with gaps.
///
/// [`Normalizer`]: crate::Normalizer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Recognized text.
    pub text: Option<String>,
    /// Confidence score as reported, not yet clamped.
    pub confidence: Option<f64>,
    /// Location of the text in the image.
    pub bounding_box: Option<BoundingBox>,
}

impl RawDetection {
    /// Creates a detection with text only.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Sets the confidence score.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Sets the bounding box.
    pub fn with_bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// Ordered detections from one OCR call, in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetections {
    detections: Vec<RawDetection>,
}

impl RawDetections {
    /// Wraps an ordered list of detections.
    pub fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }

    /// Returns the number of detections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    /// Returns `true` if nothing was detected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Iterates over the detections in order.
    pub fn iter(&self) -> impl Iterator<Item = &RawDetection> {
        self.detections.iter()
    }
}

impl From<Vec<RawDetection>> for RawDetections {
    fn from(detections: Vec<RawDetection>) -> Self {
        Self::new(detections)
    }
}

impl FromIterator<RawDetection> for RawDetections {
    fn from_iter<I: IntoIterator<Item = RawDetection>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for RawDetections {
    type IntoIter = std::vec::IntoIter<RawDetection>;
    type Item = RawDetection;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}
