//! Capability trait for pose assessment strategies.

use super::{ImageInfo, PoseAssessment};

/// Turns a pixel grid into a body-geometry assessment.
///
/// Implementations never fail: missing bodies, unavailable models and
/// uncertain detections are all encoded in the returned assessment.
pub trait PoseEstimator: Send + Sync {
    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;

    /// Assesses the body in `image`.
    fn assess(&self, image: &ImageInfo) -> PoseAssessment;
}
