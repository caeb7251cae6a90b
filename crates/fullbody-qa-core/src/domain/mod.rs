//! Core domain types for full-body photo validation.

mod assessment;
mod image_info;
mod landmark;
mod policy;
mod pose_estimator;
mod reason;
mod verdict;

pub use assessment::{PoseAssessment, QualityMetrics};
pub use image_info::ImageInfo;
pub use landmark::{BodyLandmark, LandmarkPoint, PoseLandmarks, LANDMARK_COUNT};
pub use policy::{CheckFlags, ThresholdConfig};
pub use pose_estimator::PoseEstimator;
pub use reason::ReasonCode;
pub use verdict::{ValidationChecks, ValidationMetrics, ValidationRecord, ValidationVerdict};
