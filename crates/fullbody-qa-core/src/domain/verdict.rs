//! The validation verdict returned to callers.

use serde::{Deserialize, Serialize};

use super::{QualityMetrics, ReasonCode};

/// Final decision for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// True iff `reasons` is empty.
    pub approved: bool,
    /// Unique reason codes in the order their rules fired.
    pub reasons: Vec<ReasonCode>,
    /// Metrics the decision was based on.
    pub metrics: ValidationMetrics,
    /// Derived boolean checks.
    pub checks: ValidationChecks,
}

/// A verdict tagged with the image it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRecord {
    /// Path of the validated image.
    pub path: String,
    /// Timestamp of validation (ISO 8601).
    pub timestamp: String,
    /// The verdict itself, flattened into the record.
    #[serde(flatten)]
    pub verdict: ValidationVerdict,
}

/// Quality metrics plus the pose-derived scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetrics {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub blur_score: f64,
    pub brightness: f64,
    pub body_coverage: f64,
    pub frontal_score: f64,
    pub landmark_confidence: f64,
}

impl ValidationMetrics {
    /// Quality metrics with every pose-derived score zeroed.
    #[must_use]
    pub const fn quality_only(quality: &QualityMetrics) -> Self {
        Self {
            width: quality.width,
            height: quality.height,
            aspect_ratio: quality.aspect_ratio,
            blur_score: quality.blur_score,
            brightness: quality.brightness,
            body_coverage: 0.0,
            frontal_score: 0.0,
            landmark_confidence: 0.0,
        }
    }
}

/// Boolean checks surfaced alongside the reasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationChecks {
    pub feet_visible: bool,
    pub front_facing: bool,
}

impl ValidationVerdict {
    /// Rejection with `no_person_detected`, echoing the given quality metrics.
    #[must_use]
    pub fn no_person(quality: &QualityMetrics) -> Self {
        Self {
            approved: false,
            reasons: vec![ReasonCode::NoPersonDetected],
            metrics: ValidationMetrics::quality_only(quality),
            checks: ValidationChecks::default(),
        }
    }

    /// Rejection for a request that supplied no decodable image.
    #[must_use]
    pub fn missing_image() -> Self {
        Self::no_person(&QualityMetrics::empty())
    }

    /// Returns true if the verdict carries the given reason.
    #[must_use]
    pub fn has_reason(&self, reason: ReasonCode) -> bool {
        self.reasons.contains(&reason)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_image_verdict() {
        let verdict = ValidationVerdict::missing_image();

        assert!(!verdict.approved);
        assert_eq!(verdict.reasons, vec![ReasonCode::NoPersonDetected]);
        assert_eq!(verdict.metrics.width, 0);
        assert!(!verdict.checks.feet_visible);
    }

    #[test]
    fn test_wire_format() {
        let verdict = ValidationVerdict::missing_image();
        let json = serde_json::to_value(&verdict).expect("serialize");

        assert_eq!(json["approved"], false);
        assert_eq!(json["reasons"][0], "no_person_detected");
        assert_eq!(json["metrics"]["landmarkConfidence"], 0.0);
        assert_eq!(json["checks"]["frontFacing"], false);
    }

    #[test]
    fn test_record_flattens_verdict() {
        let record = ValidationRecord {
            path: "a.jpg".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            verdict: ValidationVerdict::missing_image(),
        };
        let json = serde_json::to_value(&record).expect("serialize");

        assert_eq!(json["path"], "a.jpg");
        assert_eq!(json["approved"], false);
        assert!(json.get("verdict").is_none());
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let verdict = ValidationVerdict {
            approved: false,
            reasons: vec![ReasonCode::TooDark, ReasonCode::FeetMissing],
            metrics: ValidationMetrics {
                width: 900,
                height: 1600,
                aspect_ratio: 1.75,
                blur_score: 1234.5,
                brightness: 0.1,
                body_coverage: 0.9,
                frontal_score: 0.8,
                landmark_confidence: 0.7,
            },
            checks: ValidationChecks {
                feet_visible: false,
                front_facing: true,
            },
        };

        let json = serde_json::to_string(&verdict).expect("serialize");
        let back: ValidationVerdict = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, verdict);
    }
}
