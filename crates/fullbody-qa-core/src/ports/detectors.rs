//! Ports for the external body-landmark and face detection models.
//!
//! A model instance is not safe for concurrent invocation, so detection takes
//! `&mut self`; callers share instances through [`crate::inference::ModelSlot`],
//! which serializes calls.

use crate::domain::{ImageInfo, PoseLandmarks};

/// Locates body landmarks for (at most) one person.
pub trait LandmarkDetector: Send {
    /// Returns the landmark set, or `None` if no posture could be resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call itself fails.
    fn detect(&mut self, image: &ImageInfo) -> anyhow::Result<Option<PoseLandmarks>>;
}

/// Counts faces in an image.
pub trait FaceCounter: Send {
    /// Returns the number of faces found.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call itself fails.
    fn count_faces(&mut self, image: &ImageInfo) -> anyhow::Result<usize>;
}
