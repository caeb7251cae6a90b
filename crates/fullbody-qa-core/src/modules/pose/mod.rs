//! Pose estimation strategies.
//!
//! The strategy is chosen once at startup with [`PoseBackend`] and shared by
//! every request through the [`PoseEstimator`] trait.

mod geometric;
mod geometry;
mod landmark;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use geometric::GeometricPoseEstimator;
pub use landmark::{
    assess_landmarks, FaceSlot, LandmarkModels, LandmarkPoseEstimator, LandmarkSlot,
};

use crate::domain::PoseEstimator;

/// Which pose strategy to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoseBackend {
    /// Frame aspect ratio only. The default, since it needs no model output.
    #[default]
    Geometric,
    /// External landmark model plus a face counter.
    Landmark,
}

impl PoseBackend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Geometric => "geometric",
            Self::Landmark => "landmark",
        }
    }
}

impl fmt::Display for PoseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoseBackend {
    type Err = anyhow::Error;

    /// Accepts `heuristic` and `mediapipe` as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geometric" | "heuristic" => Ok(Self::Geometric),
            "landmark" | "landmarks" | "mediapipe" => Ok(Self::Landmark),
            other => anyhow::bail!("unknown pose backend '{other}' (expected geometric or landmark)"),
        }
    }
}

/// Builds the estimator for `backend`.
///
/// `models` is only consulted for the landmark backend. Slots load lazily, so
/// handing unused slots to the geometric backend costs nothing.
#[must_use]
pub fn create_estimator(backend: PoseBackend, models: LandmarkModels) -> Box<dyn PoseEstimator> {
    info!("Using {backend} pose backend");
    match backend {
        PoseBackend::Geometric => Box::new(GeometricPoseEstimator::new()),
        PoseBackend::Landmark => Box::new(LandmarkPoseEstimator::new(models)),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::inference::ModelSlot;

    fn unavailable_models() -> LandmarkModels {
        LandmarkModels::new(
            ModelSlot::unavailable("landmark", "not configured"),
            ModelSlot::unavailable("face", "not configured"),
        )
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!("geometric".parse::<PoseBackend>().expect("parse"), PoseBackend::Geometric);
        assert_eq!(" Landmark ".parse::<PoseBackend>().expect("parse"), PoseBackend::Landmark);
        assert_eq!("heuristic".parse::<PoseBackend>().expect("parse"), PoseBackend::Geometric);
        assert_eq!("mediapipe".parse::<PoseBackend>().expect("parse"), PoseBackend::Landmark);
        assert!("openpose".parse::<PoseBackend>().is_err());
    }

    #[test]
    fn test_default_backend_is_geometric() {
        assert_eq!(PoseBackend::default(), PoseBackend::Geometric);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PoseBackend::Landmark).expect("serialize");
        assert_eq!(json, "\"landmark\"");
    }

    #[test]
    fn test_factory_selects_strategy() {
        assert_eq!(create_estimator(PoseBackend::Geometric, unavailable_models()).name(), "geometric");
        assert_eq!(create_estimator(PoseBackend::Landmark, unavailable_models()).name(), "landmark");
    }
}
