//! Model runtime: shared model slots and the candle face detector.

mod blazeface;
mod device;
mod loader;
mod slot;

pub use blazeface::{BlazeFace, FaceBox, DEFAULT_MIN_CONFIDENCE, INPUT_SIZE};
pub use device::get_device;
pub use loader::load_safetensors;
pub use slot::{ModelSlot, ModelState};

/// Logistic function mapping a logit to a probability.
#[inline]
#[must_use]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
