//! Test support utilities for fullbody-qa.
//!
//! Provides mocks, synthetic image and landmark builders for testing the
//! validation pipeline.
//!
//! # Example
//!
//! ```
//! use fullbody_qa_test_support::{LandmarkSetBuilder, MockLandmarkDetector, SyntheticImageBuilder};
//!
//! // A sharp, tall frame and a standing subject
//! let image = SyntheticImageBuilder::portrait(900, 1600);
//! let detector = MockLandmarkDetector::returning(LandmarkSetBuilder::standing_front().build());
//! assert_eq!(image.height, 1600);
//! assert_eq!(detector.calls().get(), 0);
//! ```

mod builders;
mod mocks;

pub use builders::{LandmarkSetBuilder, SyntheticImageBuilder};
pub use mocks::{
    CallCounter, LandmarkResponse, MockFaceCounter, MockImageSource, MockLandmarkDetector,
    MockProgressSink, MockResultOutput,
};
