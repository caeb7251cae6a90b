//! Synthetic images and landmark sets for tests.

use std::path::Path;

use anyhow::Context;
use fullbody_qa_core::domain::{BodyLandmark, LandmarkPoint, PoseLandmarks, LANDMARK_COUNT};
use fullbody_qa_core::ImageInfo;
use image::{Rgb, RgbImage};

const LIGHT: Rgb<u8> = Rgb([205, 185, 165]);
const DARK: Rgb<u8> = Rgb([45, 55, 65]);

/// Builder for synthetic test images.
///
/// All images are RGB; textured images carry enough edge energy to clear the
/// default blur threshold.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// High-contrast black and white checkerboard with 8px cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Black and white checkerboard with a custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell: u32) -> ImageInfo {
        let cell = cell.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        ImageInfo::from_rgb("synthetic://checkerboard", img)
    }

    /// A single flat colour: no edges at all.
    #[must_use]
    pub fn flat(width: u32, height: u32, value: u8) -> ImageInfo {
        ImageInfo::from_rgb(
            "synthetic://flat",
            RgbImage::from_pixel(width, height, Rgb([value, value, value])),
        )
    }

    /// Mid-brightness textured frame, the shape of a good head-to-toe capture.
    #[must_use]
    pub fn portrait(width: u32, height: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / 12 + y / 12) % 2 == 0 {
                LIGHT
            } else {
                DARK
            }
        });
        ImageInfo::from_rgb("synthetic://portrait", img)
    }

    /// Textured frame scaled down to near-black.
    #[must_use]
    pub fn dark(width: u32, height: u32) -> ImageInfo {
        let img = RgbImage::from_fn(width, height, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([30, 30, 30])
            } else {
                Rgb([0, 0, 0])
            }
        });
        ImageInfo::from_rgb("synthetic://dark", img)
    }

    /// A head-and-shoulders crop letterboxed onto a tall canvas.
    ///
    /// The top 60% is textured, the rest is flat grey padding.
    #[must_use]
    pub fn padded_headshot(width: u32, height: u32) -> ImageInfo {
        let content_rows = height * 3 / 5;
        let img = RgbImage::from_fn(width, height, |x, y| {
            if y >= content_rows {
                Rgb([128, 128, 128])
            } else if (x / 10 + y / 10) % 2 == 0 {
                LIGHT
            } else {
                DARK
            }
        });
        ImageInfo::from_rgb("synthetic://padded_headshot", img)
    }

    /// Re-labels an image, e.g. with the path a sidecar is looked up by.
    #[must_use]
    pub fn labeled(image: ImageInfo, path: impl Into<String>) -> ImageInfo {
        ImageInfo::from_rgb(path, image.image)
    }

    /// Saves an image to disk; the format follows the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn save(image: &ImageInfo, path: &Path) -> anyhow::Result<()> {
        image
            .image
            .save(path)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Builder for 33-point landmark sets.
#[derive(Debug, Clone)]
pub struct LandmarkSetBuilder {
    points: Vec<LandmarkPoint>,
}

impl LandmarkSetBuilder {
    /// Every point at the frame centre with the given visibility.
    #[must_use]
    pub fn uniform(visibility: f64) -> Self {
        Self {
            points: vec![LandmarkPoint::new(0.5, 0.5, 0.0, visibility); LANDMARK_COUNT],
        }
    }

    /// A person standing square to the camera, head near the top and feet
    /// near the bottom, every point confidently located.
    #[must_use]
    pub fn standing_front() -> Self {
        use BodyLandmark::{
            LeftAnkle, LeftEar, LeftEye, LeftFootIndex, LeftHeel, LeftHip, LeftKnee, LeftShoulder,
            Nose, RightAnkle, RightEar, RightEye, RightFootIndex, RightHeel, RightHip, RightKnee,
            RightShoulder,
        };

        Self::uniform(0.95)
            .at(Nose, 0.50, 0.06)
            .at(LeftEye, 0.52, 0.05)
            .at(RightEye, 0.48, 0.05)
            .at(LeftEar, 0.54, 0.06)
            .at(RightEar, 0.46, 0.06)
            .at(LeftShoulder, 0.65, 0.20)
            .at(RightShoulder, 0.35, 0.20)
            .at(LeftHip, 0.63, 0.50)
            .at(RightHip, 0.37, 0.50)
            .at(LeftKnee, 0.57, 0.70)
            .at(RightKnee, 0.43, 0.70)
            .at(LeftAnkle, 0.56, 0.88)
            .at(RightAnkle, 0.44, 0.88)
            .at(LeftHeel, 0.56, 0.90)
            .at(RightHeel, 0.44, 0.90)
            .at(LeftFootIndex, 0.57, 0.93)
            .at(RightFootIndex, 0.43, 0.93)
    }

    /// Head and shoulders only: the lower body is out of frame.
    #[must_use]
    pub fn headshot() -> Self {
        use BodyLandmark::{
            LeftAnkle, LeftFootIndex, LeftHeel, LeftHip, LeftKnee, LeftShoulder, Nose, RightAnkle,
            RightFootIndex, RightHeel, RightHip, RightKnee, RightShoulder,
        };

        let mut builder = Self::uniform(0.9)
            .at(Nose, 0.50, 0.30)
            .at(LeftShoulder, 0.75, 0.80)
            .at(RightShoulder, 0.25, 0.80);
        for hidden in [
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
        ] {
            builder = builder.with_point(hidden, LandmarkPoint::new(0.5, 1.2, 0.0, 0.05));
        }
        builder
    }

    /// Full body turned side-on: shoulders and hips overlap horizontally and
    /// differ in depth.
    #[must_use]
    pub fn side_view() -> Self {
        use BodyLandmark::{LeftHip, LeftShoulder, RightHip, RightShoulder};

        Self::standing_front()
            .with_point(LeftShoulder, LandmarkPoint::new(0.52, 0.20, -0.25, 0.9))
            .with_point(RightShoulder, LandmarkPoint::new(0.49, 0.20, 0.25, 0.6))
            .with_point(LeftHip, LandmarkPoint::new(0.51, 0.50, -0.2, 0.9))
            .with_point(RightHip, LandmarkPoint::new(0.49, 0.50, 0.2, 0.6))
    }

    /// Moves a point, keeping its depth and visibility.
    #[must_use]
    pub fn at(mut self, landmark: BodyLandmark, x: f64, y: f64) -> Self {
        let point = &mut self.points[landmark.index()];
        point.x = x;
        point.y = y;
        self
    }

    /// Sets one point's visibility.
    #[must_use]
    pub fn visibility(mut self, landmark: BodyLandmark, visibility: f64) -> Self {
        self.points[landmark.index()].visibility = visibility;
        self
    }

    /// Replaces one point.
    #[must_use]
    pub fn with_point(mut self, landmark: BodyLandmark, point: LandmarkPoint) -> Self {
        self.points[landmark.index()] = point;
        self
    }

    #[must_use]
    pub fn build(self) -> PoseLandmarks {
        PoseLandmarks::new(self.points)
    }

    /// Writes the set as a JSON sidecar.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_sidecar(self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.build())?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
