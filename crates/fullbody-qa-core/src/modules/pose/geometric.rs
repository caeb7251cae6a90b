//! Pose estimate from frame geometry alone.
//!
//! Tall portrait framing correlates with a head-to-toe shot but does not prove
//! one. Useful when no landmark model is deployed.

use super::geometry::clamp01;
use crate::domain::{ImageInfo, PoseAssessment, PoseEstimator};

/// Frames at least this tall relative to their width are assumed to show feet.
const FEET_ASPECT_RATIO: f64 = 1.45;
/// Frames at least this many pixels tall are assumed to show the head.
const HEAD_MIN_HEIGHT: u32 = 900;
/// Width/height range that reads as a front-facing portrait.
const FRONT_WIDTH_RATIO: std::ops::RangeInclusive<f64> = 0.42..=0.85;

/// Aspect-ratio based pose estimator. Always reports one person.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricPoseEstimator;

impl GeometricPoseEstimator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PoseEstimator for GeometricPoseEstimator {
    fn name(&self) -> &'static str {
        "geometric"
    }

    fn assess(&self, image: &ImageInfo) -> PoseAssessment {
        let aspect_ratio = image.aspect_ratio();
        let width_ratio = f64::from(image.width) / f64::from(image.height.max(1));

        let body_coverage = clamp01((aspect_ratio - 1.0) / 0.9);
        let head_visible = image.height >= HEAD_MIN_HEIGHT;
        let front_facing = FRONT_WIDTH_RATIO.contains(&width_ratio);
        let head_bonus = if head_visible { 0.3 } else { 0.0 };

        PoseAssessment {
            body_coverage,
            frontal_score: if front_facing { 0.75 } else { 0.35 },
            landmark_confidence: clamp01(body_coverage.mul_add(0.7, head_bonus)),
            feet_visible: aspect_ratio >= FEET_ASPECT_RATIO,
            front_facing,
            head_visible,
            people_count: 1,
        }
    }
}
