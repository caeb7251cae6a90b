//! `BlazeFace` face detector used to count people in frame.
//!
//! Network layout follows the short-range `BlazeFace` model ("`BlazeFace`:
//! Sub-millisecond Neural Face Detection on Mobile GPUs") with batch norm folded
//! into the convolution biases, which is how the published safetensors weights
//! are stored. Only boxes and scores are decoded; keypoints are not needed to
//! count faces.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::debug;

use super::{get_device, load_safetensors, sigmoid};
use crate::domain::ImageInfo;
use crate::ports::FaceCounter;

/// Side length of the square network input.
pub const INPUT_SIZE: u32 = 128;

/// Detection floor used when none is configured.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Boxes overlapping a stronger box by more than this are dropped.
const NMS_IOU: f32 = 0.3;

/// (in, out, stride) for the blocks feeding the 16x16 head.
const FINE_BLOCKS: [(usize, usize, usize); 11] = [
    (24, 24, 1),
    (24, 28, 1),
    (28, 32, 2),
    (32, 36, 1),
    (36, 42, 1),
    (42, 48, 2),
    (48, 56, 1),
    (56, 64, 1),
    (64, 72, 1),
    (72, 80, 1),
    (80, 88, 1),
];

/// (in, out, stride) for the blocks feeding the 8x8 head.
const COARSE_BLOCKS: [(usize, usize, usize); 5] = [
    (88, 96, 2),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
];

/// A face box in normalized `[x_min, y_min, x_max, y_max]` coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub bounds: [f32; 4],
    pub score: f32,
}

impl FaceBox {
    fn area(&self) -> f32 {
        let [x0, y0, x1, y1] = self.bounds;
        (x1 - x0).max(0.0) * (y1 - y0).max(0.0)
    }

    /// Intersection over union with another box.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let [ax0, ay0, ax1, ay1] = self.bounds;
        let [bx0, by0, bx1, by1] = other.bounds;
        let overlap = (ax1.min(bx1) - ax0.max(bx0)).max(0.0) * (ay1.min(by1) - ay0.max(by0)).max(0.0);
        let union = self.area() + other.area() - overlap;
        if union > 0.0 {
            overlap / union
        } else {
            0.0
        }
    }
}

/// Depthwise-separable residual block.
struct BlazeBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
    extra_channels: usize,
    downsample: bool,
}

impl BlazeBlock {
    fn load(in_channels: usize, out_channels: usize, stride: usize, vb: &VarBuilder) -> Result<Self> {
        let downsample = stride == 2;
        let depthwise = conv2d(
            in_channels,
            in_channels,
            3,
            Conv2dConfig {
                stride,
                padding: usize::from(!downsample),
                groups: in_channels,
                ..Conv2dConfig::default()
            },
            vb.pp("depthwise"),
        )?;
        let pointwise = conv2d(
            in_channels,
            out_channels,
            1,
            Conv2dConfig::default(),
            vb.pp("pointwise"),
        )?;

        Ok(Self {
            depthwise,
            pointwise,
            extra_channels: out_channels.saturating_sub(in_channels),
            downsample,
        })
    }
}

impl Module for BlazeBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (branch_input, shortcut) = if self.downsample {
            (
                x.pad_with_zeros(2, 0, 2)?.pad_with_zeros(3, 0, 2)?,
                x.max_pool2d(2)?,
            )
        } else {
            (x.clone(), x.clone())
        };

        let branch = self.depthwise.forward(&branch_input)?.relu()?;
        let branch = self.pointwise.forward(&branch)?;

        let shortcut = if self.extra_channels > 0 {
            shortcut.pad_with_zeros(1, 0, self.extra_channels)?
        } else {
            shortcut
        };

        (branch + shortcut)?.relu()
    }
}

/// Classifier and box regressor over one feature map.
struct DetectionHead {
    classifier: Conv2d,
    regressor: Conv2d,
    grid: usize,
    anchors_per_cell: usize,
}

impl DetectionHead {
    fn load(channels: usize, grid: usize, anchors_per_cell: usize, vb: &VarBuilder) -> Result<Self> {
        let classifier = conv2d(
            channels,
            anchors_per_cell,
            1,
            Conv2dConfig::default(),
            vb.pp(format!("classifier_{grid}")),
        )?;
        let regressor = conv2d(
            channels,
            anchors_per_cell * 16,
            1,
            Conv2dConfig::default(),
            vb.pp(format!("regressor_{grid}")),
        )?;
        Ok(Self {
            classifier,
            regressor,
            grid,
            anchors_per_cell,
        })
    }

    const fn anchor_count(&self) -> usize {
        self.grid * self.grid * self.anchors_per_cell
    }

    /// Returns (logits, regressions) flattened to one row per anchor.
    fn forward(&self, features: &Tensor) -> Result<(Vec<f32>, Vec<Vec<f32>>)> {
        let n = self.anchor_count();
        let logits = self
            .classifier
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape(n)?
            .to_vec1::<f32>()?;
        let regressions = self
            .regressor
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape((n, 16))?
            .to_vec2::<f32>()?;
        Ok((logits, regressions))
    }

    /// Anchor centers in the same order as the head's output rows.
    fn anchor_centers(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        let size = self.grid as f32;
        (0..self.grid).flat_map(move |row| {
            (0..self.grid).flat_map(move |col| {
                let center = ((col as f32 + 0.5) / size, (row as f32 + 0.5) / size);
                std::iter::repeat(center).take(self.anchors_per_cell)
            })
        })
    }
}

/// `BlazeFace` detector with a fixed confidence floor.
pub struct BlazeFace {
    stem: Conv2d,
    fine: Vec<BlazeBlock>,
    coarse: Vec<BlazeBlock>,
    fine_head: DetectionHead,
    coarse_head: DetectionHead,
    device: Device,
    min_confidence: f32,
}

impl BlazeFace {
    /// Builds the network from a weight store.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor is missing or has the wrong shape.
    pub fn new(vb: &VarBuilder, min_confidence: f32) -> Result<Self> {
        let stem = conv2d(
            3,
            24,
            5,
            Conv2dConfig {
                stride: 2,
                ..Conv2dConfig::default()
            },
            vb.pp("conv0"),
        )?;

        let fine = FINE_BLOCKS
            .iter()
            .enumerate()
            .map(|(i, &(c_in, c_out, s))| BlazeBlock::load(c_in, c_out, s, &vb.pp(format!("backbone1.{i}"))))
            .collect::<Result<Vec<_>>>()?;
        let coarse = COARSE_BLOCKS
            .iter()
            .enumerate()
            .map(|(i, &(c_in, c_out, s))| BlazeBlock::load(c_in, c_out, s, &vb.pp(format!("backbone2.{i}"))))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            stem,
            fine,
            coarse,
            fine_head: DetectionHead::load(88, 16, 2, vb)?,
            coarse_head: DetectionHead::load(96, 8, 6, vb)?,
            device: vb.device().clone(),
            min_confidence,
        })
    }

    /// Loads weights from a safetensors file onto the best available device.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not match the network.
    pub fn load(path: &Path, min_confidence: f32) -> Result<Self> {
        debug!("Loading BlazeFace from {}", path.display());
        let device = get_device();
        let vb = load_safetensors(path, &device).context("Failed to load BlazeFace weights")?;
        Self::new(&vb, min_confidence).context("Failed to build BlazeFace network")
    }

    /// Resizes to the network input and scales samples to `[-1, 1]` in NCHW order.
    fn preprocess(&self, image: &RgbImage) -> Result<Tensor> {
        let resized = imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let data: Vec<f32> = resized
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 127.5 - 1.0)
            .collect();
        let side = INPUT_SIZE as usize;
        Tensor::from_vec(data, (1, side, side, 3), &self.device)?
            .permute((0, 3, 1, 2))?
            .contiguous()
            .context("Failed to build input tensor")
    }

    /// Detects faces and returns the boxes that survive suppression.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &RgbImage) -> Result<Vec<FaceBox>> {
        let input = self.preprocess(image)?;

        let x = input.pad_with_zeros(2, 1, 2)?.pad_with_zeros(3, 1, 2)?;
        let mut features = self.stem.forward(&x)?.relu()?;
        for block in &self.fine {
            features = block.forward(&features)?;
        }
        let fine_features = features.clone();
        for block in &self.coarse {
            features = block.forward(&features)?;
        }

        let mut candidates = Vec::new();
        for (head, map) in [(&self.fine_head, &fine_features), (&self.coarse_head, &features)] {
            let (logits, regressions) = head.forward(map)?;
            candidates.extend(
                head.anchor_centers()
                    .zip(logits.iter().zip(&regressions))
                    .filter_map(|(anchor, (&logit, reg))| self.decode(anchor, logit, reg)),
            );
        }

        Ok(suppress(candidates))
    }

    fn decode(&self, (ax, ay): (f32, f32), logit: f32, reg: &[f32]) -> Option<FaceBox> {
        let score = sigmoid(logit);
        if score < self.min_confidence {
            return None;
        }
        let scale = INPUT_SIZE as f32;
        let cx = ax + reg[0] / scale;
        let cy = ay + reg[1] / scale;
        let half_w = reg[2] / scale / 2.0;
        let half_h = reg[3] / scale / 2.0;
        Some(FaceBox {
            bounds: [
                (cx - half_w).clamp(0.0, 1.0),
                (cy - half_h).clamp(0.0, 1.0),
                (cx + half_w).clamp(0.0, 1.0),
                (cy + half_h).clamp(0.0, 1.0),
            ],
            score,
        })
    }
}

impl FaceCounter for BlazeFace {
    fn count_faces(&mut self, image: &ImageInfo) -> Result<usize> {
        let faces = self.detect(&image.image)?;
        debug!("{}: {} face(s)", image.path, faces.len());
        Ok(faces.len())
    }
}

/// Greedy non-maximum suppression, strongest box first.
fn suppress(mut boxes: Vec<FaceBox>) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut kept: Vec<FaceBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if kept.iter().all(|k| k.iou(&candidate) < NMS_IOU) {
            kept.push(candidate);
        }
    }
    kept
}
