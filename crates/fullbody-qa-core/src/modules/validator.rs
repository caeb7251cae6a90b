//! End-to-end validation of a single image.

use tracing::debug;

use super::decision::DecisionEngine;
use super::quality::estimate_quality;
use crate::domain::{CheckFlags, ImageInfo, PoseEstimator, ThresholdConfig, ValidationVerdict};

/// Runs the quality and pose estimators over an image and decides.
///
/// Holds only read-only state, so one instance can serve concurrent requests.
pub struct Validator {
    estimator: Box<dyn PoseEstimator>,
    engine: DecisionEngine,
    default_checks: CheckFlags,
}

impl Validator {
    #[must_use]
    pub fn new(estimator: Box<dyn PoseEstimator>, thresholds: ThresholdConfig) -> Self {
        Self {
            estimator,
            engine: DecisionEngine::new(thresholds),
            default_checks: CheckFlags::default(),
        }
    }

    /// Check flags applied when a request leaves a flag unset.
    #[must_use]
    pub const fn with_default_checks(mut self, checks: CheckFlags) -> Self {
        self.default_checks = checks;
        self
    }

    /// Name of the pose strategy in use.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.estimator.name()
    }

    #[must_use]
    pub const fn thresholds(&self) -> &ThresholdConfig {
        self.engine.thresholds()
    }

    /// Validates a decoded image.
    #[must_use]
    pub fn validate(&self, image: &ImageInfo, checks: &CheckFlags) -> ValidationVerdict {
        let checks = self.default_checks.overridden_by(*checks);
        let quality = estimate_quality(image);
        let pose = self.estimator.assess(image);
        let verdict = self.engine.decide(&quality, &pose, &checks);

        debug!(
            "{}: approved={} reasons={:?}",
            image.path, verdict.approved, verdict.reasons
        );
        verdict
    }

    /// Validates a request that may not carry a decodable image.
    ///
    /// Without an image neither estimator runs and the verdict is
    /// `no_person_detected` with zeroed metrics.
    #[must_use]
    pub fn validate_request(&self, image: Option<&ImageInfo>, checks: &CheckFlags) -> ValidationVerdict {
        image.map_or_else(ValidationVerdict::missing_image, |image| {
            self.validate(image, checks)
        })
    }
}
