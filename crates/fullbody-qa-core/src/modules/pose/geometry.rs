//! Body-geometry scores computed from a landmark set.

use crate::domain::{BodyLandmark, PoseLandmarks};

use BodyLandmark::{
    LeftAnkle, LeftEar, LeftEye, LeftFootIndex, LeftHeel, LeftHip, LeftKnee, LeftShoulder, Nose,
    RightAnkle, RightEar, RightEye, RightFootIndex, RightHeel, RightHip, RightKnee, RightShoulder,
};

/// Points at or above this visibility count toward body coverage.
const COVERAGE_VISIBILITY: f64 = 0.35;
/// The most visible head point must reach this.
const HEAD_VISIBILITY: f64 = 0.5;
/// Every foot point must reach this.
const FEET_VISIBILITY: f64 = 0.5;
/// The lowest foot point must sit at or below this normalized row.
const FEET_MIN_Y: f64 = 0.84;
/// Below this torso visibility the frontal score is forced to zero.
const CORE_VISIBILITY: f64 = 0.35;
/// The estimator's own front-facing cutoff.
pub const FRONT_FACING_SCORE: f64 = 0.6;

const HEAD: [BodyLandmark; 5] = [Nose, LeftEye, RightEye, LeftEar, RightEar];

const FEET: [BodyLandmark; 6] = [
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
];

const TORSO: [BodyLandmark; 4] = [LeftShoulder, RightShoulder, LeftHip, RightHip];

/// Points that must all be located for a confident full-body reading.
const REQUIRED: [BodyLandmark; 13] = [
    Nose,
    LeftShoulder,
    RightShoulder,
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
];

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

fn max_visibility(landmarks: &PoseLandmarks, group: &[BodyLandmark]) -> f64 {
    group
        .iter()
        .map(|&l| landmarks.visibility(l))
        .fold(0.0, f64::max)
}

fn min_visibility(landmarks: &PoseLandmarks, group: &[BodyLandmark]) -> f64 {
    group
        .iter()
        .map(|&l| landmarks.visibility(l))
        .reduce(f64::min)
        .unwrap_or(0.0)
}

/// Vertical span of the confidently located points.
pub fn body_coverage(landmarks: &PoseLandmarks) -> f64 {
    let span = landmarks
        .points()
        .iter()
        .filter(|p| p.visibility >= COVERAGE_VISIBILITY)
        .fold(None, |acc: Option<(f64, f64)>, p| match acc {
            None => Some((p.y, p.y)),
            Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
        });

    span.map_or(0.0, |(lo, hi)| clamp01(hi - lo))
}

pub fn head_visible(landmarks: &PoseLandmarks) -> bool {
    max_visibility(landmarks, &HEAD) >= HEAD_VISIBILITY
}

/// Feet are located confidently and reach the lower part of the frame.
pub fn feet_visible(landmarks: &PoseLandmarks) -> bool {
    let lowest = FEET
        .iter()
        .map(|&l| landmarks.point(l).y)
        .fold(0.0, f64::max);
    min_visibility(landmarks, &FEET) >= FEET_VISIBILITY && lowest >= FEET_MIN_Y
}

/// How squarely the torso faces the camera.
///
/// Blends the narrower of shoulder and hip width relative to torso height with
/// left/right depth symmetry.
pub fn frontal_score(landmarks: &PoseLandmarks) -> f64 {
    if min_visibility(landmarks, &TORSO) < CORE_VISIBILITY {
        return 0.0;
    }

    let ls = landmarks.point(LeftShoulder);
    let rs = landmarks.point(RightShoulder);
    let lh = landmarks.point(LeftHip);
    let rh = landmarks.point(RightHip);

    let shoulder_width = (ls.x - rs.x).abs();
    let hip_width = (lh.x - rh.x).abs();
    let torso_height = ((lh.y + rh.y) / 2.0 - (ls.y + rs.y) / 2.0).abs();

    let width_ratio = shoulder_width.min(hip_width) / torso_height.max(1e-6);
    let width_score = clamp01((width_ratio - 0.35) / 0.55);

    let z_delta = (ls.z - rs.z).abs() + (lh.z - rh.z).abs();
    let z_score = clamp01(1.0 - z_delta / 0.6);

    0.65f64.mul_add(width_score, 0.35 * z_score)
}

/// Weighted mix of average and worst visibility over the required points.
#[allow(clippy::cast_precision_loss)]
pub fn landmark_confidence(landmarks: &PoseLandmarks) -> f64 {
    let average = REQUIRED
        .iter()
        .map(|&l| landmarks.visibility(l))
        .sum::<f64>()
        / REQUIRED.len() as f64;
    clamp01(0.6f64.mul_add(average, 0.4 * min_visibility(landmarks, &REQUIRED)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LandmarkPoint, LANDMARK_COUNT};

    fn uniform(visibility: f64) -> PoseLandmarks {
        PoseLandmarks::new(vec![LandmarkPoint::new(0.5, 0.5, 0.0, visibility); LANDMARK_COUNT])
    }

    /// Square torso: shoulders and hips 0.2 apart horizontally, 0.3 vertically.
    fn torso(z_left: f64, z_right: f64) -> PoseLandmarks {
        let mut lm = uniform(0.9);
        lm.set(LeftShoulder, LandmarkPoint::new(0.6, 0.3, z_left, 0.9));
        lm.set(RightShoulder, LandmarkPoint::new(0.4, 0.3, z_right, 0.9));
        lm.set(LeftHip, LandmarkPoint::new(0.6, 0.6, z_left, 0.9));
        lm.set(RightHip, LandmarkPoint::new(0.4, 0.6, z_right, 0.9));
        lm
    }

    #[test]
    fn test_body_coverage_ignores_low_visibility() {
        let mut lm = uniform(0.9);
        lm.set(Nose, LandmarkPoint::new(0.5, 0.1, 0.0, 0.9));
        lm.set(LeftAnkle, LandmarkPoint::new(0.5, 0.9, 0.0, 0.9));
        lm.set(RightAnkle, LandmarkPoint::new(0.5, 1.0, 0.0, 0.2));

        assert!((body_coverage(&lm) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_body_coverage_without_visible_points() {
        assert!(body_coverage(&uniform(0.1)).abs() < f64::EPSILON);
        assert!(body_coverage(&PoseLandmarks::new(Vec::new())).abs() < f64::EPSILON);
    }

    #[test]
    fn test_head_visible_uses_best_point() {
        let mut lm = uniform(0.0);
        assert!(!head_visible(&lm));

        lm.set(RightEar, LandmarkPoint::new(0.5, 0.1, 0.0, 0.5));
        assert!(head_visible(&lm));
    }

    #[test]
    fn test_feet_need_visibility_and_position() {
        let mut lm = uniform(0.9);
        for foot in FEET {
            lm.set(foot, LandmarkPoint::new(0.5, 0.80, 0.0, 0.9));
        }
        assert!(!feet_visible(&lm), "feet too high in frame");

        lm.set(LeftHeel, LandmarkPoint::new(0.5, 0.84, 0.0, 0.9));
        assert!(feet_visible(&lm));

        lm.set(RightFootIndex, LandmarkPoint::new(0.5, 0.95, 0.0, 0.4));
        assert!(!feet_visible(&lm), "one foot point uncertain");
    }

    #[test]
    fn test_square_flat_torso_is_frontal() {
        // width ratio 0.2 / 0.3 = 0.667 -> width score 0.576; z score 1.0
        let score = frontal_score(&torso(0.0, 0.0));
        let expected = 0.65 * ((0.2 / 0.3 - 0.35) / 0.55) + 0.35;
        assert!((score - expected).abs() < 1e-9);
        assert!(score >= FRONT_FACING_SCORE);
    }

    #[test]
    fn test_depth_asymmetry_lowers_score() {
        let flat = frontal_score(&torso(0.0, 0.0));
        let turned = frontal_score(&torso(-0.2, 0.2));
        assert!(turned < flat);
    }

    #[test]
    fn test_occluded_torso_scores_zero() {
        let mut lm = torso(0.0, 0.0);
        lm.set(RightHip, LandmarkPoint::new(0.4, 0.6, 0.0, 0.3));
        assert!(frontal_score(&lm).abs() < f64::EPSILON);
    }

    #[test]
    fn test_collapsed_torso_does_not_divide_by_zero() {
        let mut lm = uniform(0.9);
        for l in TORSO {
            lm.set(l, LandmarkPoint::new(0.5, 0.5, 0.0, 0.9));
        }
        let score = frontal_score(&lm);
        assert!(score.is_finite());
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_landmark_confidence_mix() {
        assert!((landmark_confidence(&uniform(0.8)) - 0.8).abs() < 1e-9);

        let mut lm = uniform(1.0);
        lm.set(Nose, LandmarkPoint::new(0.5, 0.1, 0.0, 0.0));
        let average = 12.0 / 13.0;
        assert!((landmark_confidence(&lm) - 0.6 * average).abs() < 1e-9);
    }

    #[test]
    fn test_short_landmark_set_reads_as_absent() {
        let lm = PoseLandmarks::new(vec![LandmarkPoint::new(0.5, 0.2, 0.0, 0.9); 5]);
        assert!(head_visible(&lm));
        assert!(!feet_visible(&lm));
        assert!(landmark_confidence(&lm) < 0.3);
        assert!(frontal_score(&lm).abs() < f64::EPSILON);
    }
}
