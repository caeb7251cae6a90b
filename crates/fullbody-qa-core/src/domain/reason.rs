//! Machine-readable rejection reasons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why an image was rejected.
///
/// Serialized as the snake_case code consumers key off.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// No usable body was found, or no image was supplied.
    NoPersonDetected,
    /// Image is below the minimum pixel dimensions.
    ImageTooSmall,
    /// Framing or body coverage suggests the subject is cropped.
    NotHeadToToeLikely,
    /// Too little edge texture.
    TooBlurry,
    /// Mean brightness below the minimum.
    TooDark,
    /// More than one person in frame.
    MultiplePeopleDetected,
    /// Subject is turned away from the camera.
    NotFrontFacing,
    /// Feet are not confidently visible near the bottom of the frame.
    FeetMissing,
    /// Head landmarks are not visible.
    HeadMissing,
    /// Body landmarks were located with low confidence.
    BodyLandmarksLowConfidence,
}

impl ReasonCode {
    /// The wire code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoPersonDetected => "no_person_detected",
            Self::ImageTooSmall => "image_too_small",
            Self::NotHeadToToeLikely => "not_head_to_toe_likely",
            Self::TooBlurry => "too_blurry",
            Self::TooDark => "too_dark",
            Self::MultiplePeopleDetected => "multiple_people_detected",
            Self::NotFrontFacing => "not_front_facing",
            Self::FeetMissing => "feet_missing",
            Self::HeadMissing => "head_missing",
            Self::BodyLandmarksLowConfidence => "body_landmarks_low_confidence",
        }
    }

    /// A short instruction for the person who submitted the photo, if one applies.
    #[must_use]
    pub const fn guidance(self) -> Option<&'static str> {
        match self {
            Self::NotHeadToToeLikely => {
                Some("Include your full head-to-toe body in frame (no cropping).")
            }
            Self::FeetMissing => Some("Make sure your feet (shoes) are fully visible in the photo."),
            Self::HeadMissing => Some("Make sure your full head is visible in the photo."),
            Self::NotFrontFacing => Some("Stand facing the camera (front-facing)."),
            Self::TooBlurry => Some("Use a sharper photo (avoid motion blur)."),
            Self::TooDark => Some("Use brighter lighting (avoid strong shadows)."),
            Self::MultiplePeopleDetected => Some("Upload a photo with only you in frame."),
            Self::NoPersonDetected => {
                Some("Upload a clear photo where your whole body is visible.")
            }
            Self::ImageTooSmall => Some("Upload a higher-resolution photo."),
            Self::BodyLandmarksLowConfidence => None,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    const ALL: [ReasonCode; 10] = [
        ReasonCode::NoPersonDetected,
        ReasonCode::ImageTooSmall,
        ReasonCode::NotHeadToToeLikely,
        ReasonCode::TooBlurry,
        ReasonCode::TooDark,
        ReasonCode::MultiplePeopleDetected,
        ReasonCode::NotFrontFacing,
        ReasonCode::FeetMissing,
        ReasonCode::HeadMissing,
        ReasonCode::BodyLandmarksLowConfidence,
    ];

    #[test]
    fn test_serde_matches_as_str() {
        for code in ALL {
            let json = serde_json::to_string(&code).expect("serialize");
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_parse_wire_code() {
        let code: ReasonCode = serde_json::from_str("\"feet_missing\"").expect("parse");
        assert_eq!(code, ReasonCode::FeetMissing);
    }

    #[test]
    fn test_guidance_for_user_facing_codes() {
        assert!(ReasonCode::FeetMissing
            .guidance()
            .is_some_and(|g| g.contains("feet")));
        assert!(ReasonCode::BodyLandmarksLowConfidence.guidance().is_none());
    }
}
