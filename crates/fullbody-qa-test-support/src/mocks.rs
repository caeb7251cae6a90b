//! Mock implementations of core port traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use fullbody_qa_core::ports::LoadFailure;
use fullbody_qa_core::{
    FaceCounter, ImageInfo, ImageSource, LandmarkDetector, PoseLandmarks, ProgressEvent,
    ProgressSink, ResultOutput, ValidationRecord,
};

/// Shared call counter handed out by the detector mocks.
///
/// Clones observe the same counts, so a test can keep one after the mock has
/// been moved into a model slot. Besides the total it tracks how many calls
/// are running right now and the most that ever ran at once.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<CallStats>);

#[derive(Debug, Default)]
struct CallStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl CallCounter {
    fn enter(&self) {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.0.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.0.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// Number of calls so far.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that overlapped.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.0.peak.load(Ordering::SeqCst)
    }
}

/// Call bookkeeping shared by the detector mocks.
#[derive(Debug, Default)]
struct CallTracker {
    own: CallCounter,
    observer: Option<CallCounter>,
    delay: Duration,
}

impl CallTracker {
    fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.own.enter();
        if let Some(observer) = &self.observer {
            observer.enter();
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        let result = f();
        if let Some(observer) = &self.observer {
            observer.exit();
        }
        self.own.exit();
        result
    }
}

enum SourceItem {
    Image(ImageInfo),
    Unreadable { path: String, reason: String },
}

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images (and scripted decode failures) and tracks
/// iteration for assertions.
pub struct MockImageSource {
    items: Vec<SourceItem>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<ImageInfo>) -> Self {
        Self {
            items: images.into_iter().map(SourceItem::Image).collect(),
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Appends an entry that fails to decode.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<String>, reason: impl Into<String>) -> Self {
        self.items.push(SourceItem::Unreadable {
            path: path.into(),
            reason: reason.into(),
        });
        self
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadFailure>> + Send + '_> {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;

        Box::new(self.items.iter().map(|item| match item {
            SourceItem::Image(image) => Ok(image.clone()),
            SourceItem::Unreadable { path, reason } => Err(LoadFailure {
                path: path.clone(),
                error: anyhow::anyhow!("{reason}"),
            }),
        }))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures records for later assertions.
#[derive(Default)]
pub struct MockResultOutput {
    records: Mutex<Vec<ValidationRecord>>,
    flush_count: AtomicUsize,
}

impl MockResultOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured records.
    #[must_use]
    pub fn records(&self) -> Vec<ValidationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flush_count.load(Ordering::SeqCst)
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, record: &ValidationRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        self.flush_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
#[derive(Default)]
pub struct MockProgressSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MockProgressSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn count(&self, pred: impl Fn(&ProgressEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Started { .. }))
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Completed { .. }))
    }

    /// Returns the number of `Unreadable` events.
    #[must_use]
    pub fn unreadable_count(&self) -> usize {
        self.count(|e| matches!(e, ProgressEvent::Unreadable { .. }))
    }

    /// Returns the `(approved, rejected)` totals from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished {
                approved, rejected, ..
            } => Some((*approved, *rejected)),
            _ => None,
        })
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// What a [`MockLandmarkDetector`] answers with.
#[derive(Debug, Clone)]
pub enum LandmarkResponse {
    Found(PoseLandmarks),
    NoPose,
    Fail(String),
}

/// Scripted `LandmarkDetector`.
///
/// Answers from a queue; once the queue is drained the last answer repeats.
pub struct MockLandmarkDetector {
    responses: VecDeque<LandmarkResponse>,
    last: LandmarkResponse,
    tracker: CallTracker,
}

impl MockLandmarkDetector {
    /// Answers every call with `landmarks`.
    #[must_use]
    pub fn returning(landmarks: PoseLandmarks) -> Self {
        Self::scripted(vec![LandmarkResponse::Found(landmarks)])
    }

    /// Never resolves a posture.
    #[must_use]
    pub fn no_pose() -> Self {
        Self::scripted(vec![LandmarkResponse::NoPose])
    }

    /// Fails every call.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted(vec![LandmarkResponse::Fail(message.into())])
    }

    /// Answers calls in order.
    #[must_use]
    pub fn scripted(responses: Vec<LandmarkResponse>) -> Self {
        let last = responses
            .last()
            .cloned()
            .unwrap_or(LandmarkResponse::NoPose);
        Self {
            responses: responses.into(),
            last,
            tracker: CallTracker::default(),
        }
    }

    /// Sleeps for `delay` inside every call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.tracker.delay = delay;
        self
    }

    /// Also reports every call to `observer`.
    #[must_use]
    pub fn observed_by(mut self, observer: &CallCounter) -> Self {
        self.tracker.observer = Some(observer.clone());
        self
    }

    /// Handle that keeps counting after the mock is moved.
    #[must_use]
    pub fn calls(&self) -> CallCounter {
        self.tracker.own.clone()
    }
}

impl LandmarkDetector for MockLandmarkDetector {
    fn detect(&mut self, _image: &ImageInfo) -> anyhow::Result<Option<PoseLandmarks>> {
        let response = self.responses.pop_front().unwrap_or_else(|| self.last.clone());
        self.tracker.run(|| match response {
            LandmarkResponse::Found(landmarks) => Ok(Some(landmarks)),
            LandmarkResponse::NoPose => Ok(None),
            LandmarkResponse::Fail(message) => Err(anyhow::anyhow!(message)),
        })
    }
}

/// `FaceCounter` with a fixed answer.
pub struct MockFaceCounter {
    faces: Result<usize, String>,
    tracker: CallTracker,
}

impl MockFaceCounter {
    #[must_use]
    pub fn with_count(faces: usize) -> Self {
        Self {
            faces: Ok(faces),
            tracker: CallTracker::default(),
        }
    }

    /// Fails every call.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            faces: Err(message.into()),
            tracker: CallTracker::default(),
        }
    }

    /// Sleeps for `delay` inside every call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.tracker.delay = delay;
        self
    }

    /// Also reports every call to `observer`.
    #[must_use]
    pub fn observed_by(mut self, observer: &CallCounter) -> Self {
        self.tracker.observer = Some(observer.clone());
        self
    }

    /// Handle that keeps counting after the mock is moved.
    #[must_use]
    pub fn calls(&self) -> CallCounter {
        self.tracker.own.clone()
    }
}

impl FaceCounter for MockFaceCounter {
    fn count_faces(&mut self, _image: &ImageInfo) -> anyhow::Result<usize> {
        self.tracker
            .run(|| self.faces.clone().map_err(|message| anyhow::anyhow!(message)))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use fullbody_qa_core::ValidationVerdict;

    fn image() -> ImageInfo {
        ImageInfo::new("test.jpg", image::DynamicImage::new_rgb8(10, 20))
    }

    #[test]
    fn test_mock_image_source_empty() {
        let source = MockImageSource::empty();
        assert_eq!(source.count_hint(), Some(0));
        assert_eq!(source.images().count(), 0);
        assert_eq!(source.iteration_count(), 1);
    }

    #[test]
    fn test_mock_image_source_with_unreadable() {
        let source =
            MockImageSource::new(vec![image()]).with_unreadable("broken.jpg", "truncated");

        let items: Vec<_> = source.images().collect();
        assert_eq!(source.count_hint(), Some(2));
        assert!(items[0].is_ok());
        let failure = items[1].as_ref().expect_err("unreadable");
        assert_eq!(failure.path, "broken.jpg");
        assert_eq!(failure.error.to_string(), "truncated");
    }

    #[test]
    fn test_mock_result_output() {
        let output = MockResultOutput::new();
        let record = ValidationRecord {
            path: "test.jpg".into(),
            timestamp: "2024-01-01T00:00:00Z".into(),
            verdict: ValidationVerdict::missing_image(),
        };

        output.write(&record).expect("write");
        output.flush().expect("flush");

        assert_eq!(output.records().len(), 1);
        assert_eq!(output.records()[0].path, "test.jpg");
        assert_eq!(output.flush_count(), 1);
    }

    #[test]
    fn test_mock_progress_sink() {
        let sink = MockProgressSink::new();

        sink.on_event(ProgressEvent::Started {
            path: "test.jpg".into(),
            index: 0,
            total: Some(2),
        });
        sink.on_event(ProgressEvent::Unreadable {
            path: "broken.jpg".into(),
            reason: "truncated".into(),
        });
        sink.on_event(ProgressEvent::Finished {
            approved: 0,
            rejected: 2,
            unreadable: 1,
        });

        assert_eq!(sink.started_count(), 1);
        assert_eq!(sink.unreadable_count(), 1);
        assert_eq!(sink.completed_count(), 0);
        assert_eq!(sink.finished_counts(), Some((0, 2)));
    }

    #[test]
    fn test_scripted_detector_repeats_last_answer() {
        let mut detector = MockLandmarkDetector::scripted(vec![
            LandmarkResponse::Fail("warming up".into()),
            LandmarkResponse::NoPose,
        ]);
        let calls = detector.calls();

        assert!(detector.detect(&image()).is_err());
        assert!(detector.detect(&image()).expect("ok").is_none());
        assert!(detector.detect(&image()).expect("ok").is_none());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_face_counter() {
        let mut counter = MockFaceCounter::with_count(3);
        let calls = counter.calls();
        assert_eq!(counter.count_faces(&image()).expect("count"), 3);
        assert_eq!(calls.get(), 1);

        assert!(MockFaceCounter::failing("no weights")
            .count_faces(&image())
            .is_err());
    }

    #[test]
    fn test_observer_sees_overlapping_calls() {
        let shared = CallCounter::default();
        let mut detector = MockLandmarkDetector::no_pose()
            .with_delay(Duration::from_millis(1))
            .observed_by(&shared);
        let mut counter = MockFaceCounter::with_count(1).observed_by(&shared);

        detector.detect(&image()).expect("detect");
        counter.count_faces(&image()).expect("count");

        assert_eq!(detector.calls().peak(), 1);
        assert_eq!(shared.get(), 2);
        assert_eq!(shared.peak(), 1, "sequential calls never overlap");
    }
}
