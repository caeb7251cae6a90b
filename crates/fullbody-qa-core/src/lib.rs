//! Full-body photo validation core.
//!
//! Domain types, the quality and pose estimators, the decision engine, and the
//! ports through which adapters feed images, landmark sets and face counts in.

pub mod domain;
pub mod inference;
pub mod modules;
pub mod ports;

pub use domain::{
    CheckFlags, ImageInfo, PoseAssessment, PoseEstimator, PoseLandmarks, QualityMetrics,
    ReasonCode, ThresholdConfig, ValidationRecord, ValidationVerdict,
};
pub use modules::{PoseBackend, Validator};
pub use ports::{
    FaceCounter, ImageSource, LandmarkDetector, ProgressEvent, ProgressSink, ResultOutput,
};
