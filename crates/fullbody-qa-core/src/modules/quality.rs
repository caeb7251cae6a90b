//! Image quality metrics: dimensions, brightness and sharpness.

#![allow(clippy::cast_precision_loss)]

use image::RgbImage;
use tracing::debug;

use super::blur::gradient_variance;
use crate::domain::{ImageInfo, QualityMetrics};

/// BT.601 luma weights for R, G and B.
const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Per-pixel luma in row-major order, on the 0-255 scale.
#[derive(Debug, Clone)]
pub struct LumaPlane {
    width: usize,
    height: usize,
    values: Vec<f64>,
}

impl LumaPlane {
    /// Converts an RGB grid to luma.
    #[must_use]
    pub fn from_rgb(image: &RgbImage) -> Self {
        let values = image
            .pixels()
            .map(|p| {
                LUMA_WEIGHTS
                    .iter()
                    .zip(p.0)
                    .map(|(w, c)| w * f64::from(c))
                    .sum::<f64>()
            })
            .collect();
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            values,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Luma at column `x`, row `y`.
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    /// Rows of the plane, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.width.max(1))
    }

    /// Mean luma, 0.0 for an empty plane.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// Measures [`QualityMetrics`] for an image. Never fails.
#[must_use]
pub fn estimate_quality(image: &ImageInfo) -> QualityMetrics {
    let luma = LumaPlane::from_rgb(&image.image);
    let metrics = QualityMetrics {
        width: image.width,
        height: image.height,
        aspect_ratio: image.aspect_ratio(),
        brightness: (luma.mean() / 255.0).clamp(0.0, 1.0),
        blur_score: gradient_variance(&luma),
    };

    debug!(
        "{}: {}x{} aspect={:.3} brightness={:.3} blur={:.1}",
        image.path,
        metrics.width,
        metrics.height,
        metrics.aspect_ratio,
        metrics.brightness,
        metrics.blur_score
    );

    metrics
}
