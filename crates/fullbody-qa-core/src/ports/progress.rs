//! Progress reporting port for UI integration.

use crate::domain::ValidationRecord;

/// Events emitted during a batch run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Validation started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// Validation completed for an image.
    Completed {
        /// The validation record.
        record: ValidationRecord,
    },
    /// An image could not be decoded and was rejected without analysis.
    Unreadable {
        /// Path to the image.
        path: String,
        /// Decoding error.
        reason: String,
    },
    /// All images have been processed.
    Finished {
        /// Images approved.
        approved: usize,
        /// Images rejected, unreadable ones included.
        rejected: usize,
        /// Images that could not be decoded.
        unreadable: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
