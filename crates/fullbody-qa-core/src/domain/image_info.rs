//! Decoded image handed to the estimators.

use image::{DynamicImage, RgbImage};

/// A decoded RGB pixel grid plus the label of the source it came from.
///
/// Both estimators borrow the same instance; nothing mutates it after decoding.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path (or synthetic label) of the image source.
    pub path: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Decoded 8-bit RGB samples.
    pub image: RgbImage,
}

impl ImageInfo {
    /// Wraps a decoded image, converting it to 8-bit RGB.
    #[must_use]
    pub fn new(path: impl Into<String>, image: DynamicImage) -> Self {
        Self::from_rgb(path, image.to_rgb8())
    }

    /// Wraps an RGB buffer without conversion.
    #[must_use]
    pub fn from_rgb(path: impl Into<String>, image: RgbImage) -> Self {
        Self {
            path: path.into(),
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Height over width, with the width floored at one pixel.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.height) / f64::from(self.width.max(1))
    }
}
