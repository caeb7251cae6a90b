//! Threshold rules turning metrics into a verdict.

use crate::domain::{
    CheckFlags, PoseAssessment, QualityMetrics, ReasonCode, ThresholdConfig, ValidationChecks,
    ValidationMetrics, ValidationVerdict,
};

/// Applies [`ThresholdConfig`] to quality and pose metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    thresholds: ThresholdConfig,
}

impl DecisionEngine {
    #[must_use]
    pub const fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    #[must_use]
    pub const fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Builds the verdict for one image.
    ///
    /// With no person the only reason is `no_person_detected` and the pose
    /// metrics are zeroed. Otherwise every rule is evaluated in a fixed order
    /// and each reason appears once, at the position it first fired.
    #[must_use]
    pub fn decide(
        &self,
        quality: &QualityMetrics,
        pose: &PoseAssessment,
        checks: &CheckFlags,
    ) -> ValidationVerdict {
        if !pose.has_person() {
            return ValidationVerdict::no_person(quality);
        }

        let t = &self.thresholds;
        let front_facing = pose.frontal_score >= t.min_frontal_score;

        let rules = [
            (
                quality.width < t.min_width || quality.height < t.min_height,
                ReasonCode::ImageTooSmall,
            ),
            (
                quality.aspect_ratio < t.min_aspect_ratio,
                ReasonCode::NotHeadToToeLikely,
            ),
            (quality.blur_score < t.min_blur_score, ReasonCode::TooBlurry),
            (quality.brightness < t.min_brightness, ReasonCode::TooDark),
            (pose.people_count > 1, ReasonCode::MultiplePeopleDetected),
            (
                pose.body_coverage < t.min_body_coverage,
                ReasonCode::NotHeadToToeLikely,
            ),
            (!front_facing, ReasonCode::NotFrontFacing),
            (
                checks.require_feet_visible() && !pose.feet_visible,
                ReasonCode::FeetMissing,
            ),
            (!pose.head_visible, ReasonCode::HeadMissing),
            (
                pose.landmark_confidence < t.min_landmark_confidence,
                ReasonCode::BodyLandmarksLowConfidence,
            ),
        ];

        let mut reasons: Vec<ReasonCode> = Vec::new();
        for (fired, reason) in rules {
            if fired && !reasons.contains(&reason) {
                reasons.push(reason);
            }
        }

        ValidationVerdict {
            approved: reasons.is_empty(),
            reasons,
            metrics: ValidationMetrics {
                body_coverage: pose.body_coverage,
                frontal_score: pose.frontal_score,
                landmark_confidence: pose.landmark_confidence,
                ..ValidationMetrics::quality_only(quality)
            },
            checks: ValidationChecks {
                feet_visible: pose.feet_visible,
                front_facing,
            },
        }
    }
}
