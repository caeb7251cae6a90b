//! Image source port for loading images from various sources.

use crate::domain::ImageInfo;

/// An image that could not be decoded.
#[derive(Debug)]
pub struct LoadFailure {
    /// Path of the source that failed.
    pub path: String,
    /// Why decoding failed.
    pub error: anyhow::Error,
}

/// Port for loading images from a source.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over images from this source.
    ///
    /// # Errors
    ///
    /// Individual items are errors if an image fails to load; they still carry
    /// the path so the caller can report a verdict for it.
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadFailure>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}
