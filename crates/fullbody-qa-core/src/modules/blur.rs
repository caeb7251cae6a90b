//! Sharpness proxy from luma gradients.
//!
//! Each pixel gets the absolute luma step from its left neighbour plus the step
//! from the neighbour above. The first column gets no horizontal term and the
//! first row no vertical term. The score is the population variance of that
//! grid: flat or smeared images score low, crisp edges score high.

#![allow(clippy::cast_precision_loss)]

use super::quality::LumaPlane;

/// Population variance of the gradient magnitude grid. 0.0 for an empty plane.
#[must_use]
pub fn gradient_variance(luma: &LumaPlane) -> f64 {
    let count = luma.width() * luma.height();
    if count == 0 {
        return 0.0;
    }

    let magnitudes = gradient_magnitudes(luma);
    let mean = magnitudes.iter().sum::<f64>() / count as f64;
    magnitudes.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / count as f64
}

fn gradient_magnitudes(luma: &LumaPlane) -> Vec<f64> {
    let mut out = Vec::with_capacity(luma.width() * luma.height());
    let mut above: Option<&[f64]> = None;

    for row in luma.rows() {
        for (x, &value) in row.iter().enumerate() {
            let horizontal = if x > 0 { (value - row[x - 1]).abs() } else { 0.0 };
            let vertical = above.map_or(0.0, |prev| (value - prev[x]).abs());
            out.push(horizontal + vertical);
        }
        above = Some(row);
    }

    out
}
