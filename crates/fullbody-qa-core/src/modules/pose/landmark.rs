//! Pose estimate from detected body landmarks plus a face count.

use tracing::{debug, warn};

use super::geometry::{
    body_coverage, feet_visible, frontal_score, head_visible, landmark_confidence,
    FRONT_FACING_SCORE,
};
use crate::domain::{ImageInfo, PoseAssessment, PoseEstimator, PoseLandmarks};
use crate::inference::{ModelSlot, ModelState};
use crate::ports::{FaceCounter, LandmarkDetector};

/// Shared landmark model instance.
pub type LandmarkSlot = ModelSlot<Box<dyn LandmarkDetector>>;
/// Shared face model instance.
pub type FaceSlot = ModelSlot<Box<dyn FaceCounter>>;

/// The two model instances the landmark estimator calls into.
pub struct LandmarkModels {
    pub landmarks: LandmarkSlot,
    pub faces: FaceSlot,
}

impl LandmarkModels {
    #[must_use]
    pub const fn new(landmarks: LandmarkSlot, faces: FaceSlot) -> Self {
        Self { landmarks, faces }
    }

    /// Wraps already constructed detectors.
    #[must_use]
    pub fn ready(
        landmarks: impl LandmarkDetector + 'static,
        faces: impl FaceCounter + 'static,
    ) -> Self {
        Self::new(
            ModelSlot::ready("landmark", Box::new(landmarks)),
            ModelSlot::ready("face", Box::new(faces)),
        )
    }
}

/// Landmark-based pose estimator.
///
/// Fails closed: when the landmark model is unavailable every image is
/// reported as having no person. A missing or failing face model only loses
/// the group-photo signal.
pub struct LandmarkPoseEstimator {
    models: LandmarkModels,
}

impl LandmarkPoseEstimator {
    #[must_use]
    pub const fn new(models: LandmarkModels) -> Self {
        Self { models }
    }

    /// Lifecycle state of the landmark model.
    #[must_use]
    pub fn landmark_state(&self) -> ModelState {
        self.models.landmarks.state()
    }

    /// Lifecycle state of the face model.
    #[must_use]
    pub fn face_state(&self) -> ModelState {
        self.models.faces.state()
    }

    fn count_faces(&self, image: &ImageInfo) -> usize {
        match self.models.faces.with(|model| model.count_faces(image)) {
            Some(Ok(count)) => count,
            Some(Err(e)) => {
                warn!("{}: face detection failed: {e:#}", image.path);
                0
            }
            None => 0,
        }
    }
}

fn to_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// People count when faces were seen but no posture was resolved.
fn people_without_pose(faces: usize) -> u32 {
    match faces {
        0 => 0,
        1 => 1,
        n => to_count(n),
    }
}

/// Scores a resolved landmark set.
#[must_use]
pub fn assess_landmarks(landmarks: &PoseLandmarks, faces: usize) -> PoseAssessment {
    let frontal = frontal_score(landmarks);
    PoseAssessment {
        body_coverage: body_coverage(landmarks),
        frontal_score: frontal,
        landmark_confidence: landmark_confidence(landmarks),
        feet_visible: feet_visible(landmarks),
        front_facing: frontal >= FRONT_FACING_SCORE,
        head_visible: head_visible(landmarks),
        people_count: if faces >= 2 { to_count(faces) } else { 1 },
    }
}

impl PoseEstimator for LandmarkPoseEstimator {
    fn name(&self) -> &'static str {
        "landmark"
    }

    fn assess(&self, image: &ImageInfo) -> PoseAssessment {
        if !self.models.landmarks.is_available() {
            debug!("{}: landmark model unavailable", image.path);
            return PoseAssessment::no_person();
        }

        let faces = self.count_faces(image);

        match self.models.landmarks.with(|model| model.detect(image)) {
            Some(Ok(Some(landmarks))) => {
                debug!("{}: {} landmarks, {faces} face(s)", image.path, landmarks.len());
                assess_landmarks(&landmarks, faces)
            }
            Some(Ok(None)) => {
                debug!("{}: no posture resolved, {faces} face(s)", image.path);
                PoseAssessment::absent(people_without_pose(faces))
            }
            Some(Err(e)) => {
                warn!("{}: landmark detection failed: {e:#}", image.path);
                PoseAssessment::no_person()
            }
            None => PoseAssessment::no_person(),
        }
    }
}
