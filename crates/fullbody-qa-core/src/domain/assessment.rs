//! Outputs of the two estimators.

use serde::{Deserialize, Serialize};

/// Image quality metrics measured from the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Height over width.
    pub aspect_ratio: f64,
    /// Mean luma scaled to 0.0-1.0.
    pub brightness: f64,
    /// Variance of the luma gradient magnitude; higher means sharper.
    pub blur_score: f64,
}

impl QualityMetrics {
    /// Metrics reported when no image could be decoded.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            aspect_ratio: 0.0,
            brightness: 0.0,
            blur_score: 0.0,
        }
    }
}

/// Body-geometry assessment produced by a pose estimator.
///
/// `people_count == 0` means no usable body was found; every other field is
/// then at its absent value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseAssessment {
    /// Fraction of the frame height spanned by the visible body (0.0-1.0).
    pub body_coverage: f64,
    /// How squarely the subject faces the camera (0.0-1.0).
    pub frontal_score: f64,
    /// Aggregate landmark visibility (0.0-1.0).
    pub landmark_confidence: f64,
    /// Feet are located confidently near the bottom of the frame.
    pub feet_visible: bool,
    /// Estimator's own front-facing call.
    pub front_facing: bool,
    /// Head landmarks are visible.
    pub head_visible: bool,
    /// Number of people detected.
    pub people_count: u32,
}

impl PoseAssessment {
    /// Assessment with every field absent and the given person count.
    #[must_use]
    pub const fn absent(people_count: u32) -> Self {
        Self {
            body_coverage: 0.0,
            frontal_score: 0.0,
            landmark_confidence: 0.0,
            feet_visible: false,
            front_facing: false,
            head_visible: false,
            people_count,
        }
    }

    /// Assessment meaning "no usable body found".
    #[must_use]
    pub const fn no_person() -> Self {
        Self::absent(0)
    }

    /// Returns true if a person was found.
    #[must_use]
    pub const fn has_person(&self) -> bool {
        self.people_count > 0
    }
}
