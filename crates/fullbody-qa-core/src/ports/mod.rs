//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the domain core and external adapters.

mod detectors;
mod image_source;
mod progress;
mod result_output;

pub use detectors::{FaceCounter, LandmarkDetector};
pub use image_source::{ImageSource, LoadFailure};
pub use progress::{ProgressEvent, ProgressSink};
pub use result_output::ResultOutput;
