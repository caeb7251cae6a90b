//! Body landmarks reported by an external pose model.

use serde::{Deserialize, Serialize};

/// Number of points in a full landmark set.
pub const LANDMARK_COUNT: usize = 33;

/// Named body landmarks, in the model's fixed index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyLandmark {
    /// Index of this landmark within a landmark set.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single landmark in normalized image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    /// Horizontal position, 0.0 (left) to 1.0 (right).
    pub x: f64,
    /// Vertical position, 0.0 (top) to 1.0 (bottom).
    pub y: f64,
    /// Relative depth; smaller is closer to the camera.
    #[serde(default)]
    pub z: f64,
    /// Confidence that the point is visible and correctly located.
    #[serde(default)]
    pub visibility: f64,
}

impl LandmarkPoint {
    /// Creates a landmark point.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self {
            x,
            y,
            z,
            visibility,
        }
    }
}

/// One person's landmark set.
///
/// Points beyond the end of a short set read as all-zero points, so lookups
/// never fail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseLandmarks {
    points: Vec<LandmarkPoint>,
}

impl PoseLandmarks {
    /// Wraps the points reported by the model.
    #[must_use]
    pub const fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }

    /// Returns the named point.
    #[must_use]
    pub fn point(&self, landmark: BodyLandmark) -> LandmarkPoint {
        self.points
            .get(landmark.index())
            .copied()
            .unwrap_or_default()
    }

    /// Replaces the named point, padding a short set with zero points.
    pub fn set(&mut self, landmark: BodyLandmark, point: LandmarkPoint) {
        let index = landmark.index();
        if self.points.len() <= index {
            self.points.resize(index + 1, LandmarkPoint::default());
        }
        self.points[index] = point;
    }

    /// Returns the visibility of the named point.
    #[must_use]
    pub fn visibility(&self, landmark: BodyLandmark) -> f64 {
        self.point(landmark).visibility
    }

    /// All reported points in index order.
    #[must_use]
    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    /// Number of reported points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the model reported no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
