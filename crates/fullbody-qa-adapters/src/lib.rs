//! Adapters for fullbody-qa.
//!
//! - Filesystem image source
//! - Landmark sidecar reader
//! - Model weight locations

pub mod fs;
pub mod models;
pub mod sidecar;

pub use fs::FsImageSource;
pub use models::{list_models, model_path_in, models_dir, ModelStatus};
pub use sidecar::SidecarLandmarks;
