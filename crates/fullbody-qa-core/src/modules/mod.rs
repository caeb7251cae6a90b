//! Estimators and the decision engine.

mod blur;
mod decision;
pub mod pose;
mod quality;
mod validator;

pub use blur::gradient_variance;
pub use decision::DecisionEngine;
pub use pose::{
    assess_landmarks, create_estimator, FaceSlot, GeometricPoseEstimator, LandmarkModels,
    LandmarkPoseEstimator, LandmarkSlot, PoseBackend,
};
pub use quality::{estimate_quality, LumaPlane};
pub use validator::Validator;
