//! Process-wide thresholds and per-request check flags.

use serde::{Deserialize, Serialize};

/// Minimum values an image must reach to be approved.
///
/// Loaded once at startup and shared read-only by every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum width in pixels.
    pub min_width: u32,
    /// Minimum height in pixels.
    pub min_height: u32,
    /// Minimum height/width ratio.
    pub min_aspect_ratio: f64,
    /// Minimum gradient-variance blur score.
    pub min_blur_score: f64,
    /// Minimum mean brightness (0.0-1.0).
    pub min_brightness: f64,
    /// Minimum body coverage (0.0-1.0).
    pub min_body_coverage: f64,
    /// Minimum frontal score (0.0-1.0).
    pub min_frontal_score: f64,
    /// Minimum landmark confidence (0.0-1.0).
    pub min_landmark_confidence: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_width: 512,
            min_height: 900,
            min_aspect_ratio: 1.3,
            min_blur_score: 10.0,
            min_brightness: 0.12,
            min_body_coverage: 0.70,
            min_frontal_score: 0.45,
            min_landmark_confidence: 0.55,
        }
    }
}

/// Optional rules a caller can toggle for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckFlags {
    /// Reject images whose feet are not visible. Defaults to true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_feet_visible: Option<bool>,
}

impl CheckFlags {
    /// Whether the feet rule is enforced.
    #[must_use]
    pub fn require_feet_visible(&self) -> bool {
        self.require_feet_visible.unwrap_or(true)
    }

    /// Values from `other` override values in `self` when present.
    #[must_use]
    pub fn overridden_by(self, other: Self) -> Self {
        Self {
            require_feet_visible: other.require_feet_visible.or(self.require_feet_visible),
        }
    }
}
