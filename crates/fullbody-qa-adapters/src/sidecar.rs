//! Landmark sets produced by an external pose model, read from JSON sidecars.
//!
//! For `photos/alice.jpg` the sidecar is `photos/alice.landmarks.json`, or
//! `<dir>/alice.landmarks.json` when a landmarks directory is configured. The
//! file holds either a bare array of points or `{"landmarks": [...]}`; a
//! `null` or empty set means the model resolved no posture.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fullbody_qa_core::{ImageInfo, LandmarkDetector, PoseLandmarks};
use serde::Deserialize;
use tracing::debug;

/// Suffix appended to the image stem.
pub const SIDECAR_SUFFIX: &str = ".landmarks.json";

#[derive(Deserialize)]
#[serde(untagged)]
enum SidecarFile {
    Points(PoseLandmarks),
    Document { landmarks: Option<PoseLandmarks> },
}

impl SidecarFile {
    fn into_landmarks(self) -> Option<PoseLandmarks> {
        let landmarks = match self {
            Self::Points(points) => Some(points),
            Self::Document { landmarks } => landmarks,
        };
        landmarks.filter(|l| !l.is_empty())
    }
}

/// [`LandmarkDetector`] backed by sidecar files.
#[derive(Debug, Clone, Default)]
pub struct SidecarLandmarks {
    dir: Option<PathBuf>,
}

impl SidecarLandmarks {
    /// Reads sidecars next to each image.
    #[must_use]
    pub const fn beside_images() -> Self {
        Self { dir: None }
    }

    /// Reads sidecars from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is not an existing directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!("Landmarks directory not found: {}", dir.display());
        }
        Ok(Self { dir: Some(dir) })
    }

    /// Where the sidecar for `image` is expected.
    #[must_use]
    pub fn sidecar_path(&self, image: &Path) -> PathBuf {
        let stem = image.file_stem().unwrap_or(image.as_os_str());
        let mut name = stem.to_os_string();
        name.push(SIDECAR_SUFFIX);

        match &self.dir {
            Some(dir) => dir.join(name),
            None => image.with_file_name(name),
        }
    }
}

impl LandmarkDetector for SidecarLandmarks {
    fn detect(&mut self, image: &ImageInfo) -> Result<Option<PoseLandmarks>> {
        let path = self.sidecar_path(Path::new(&image.path));
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No landmark sidecar at {}", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };

        let file: Option<SidecarFile> = serde_json::from_str(&text)
            .with_context(|| format!("Malformed landmark sidecar: {}", path.display()))?;
        Ok(file.and_then(SidecarFile::into_landmarks))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn image_at(path: &Path) -> ImageInfo {
        ImageInfo::from_rgb(path.to_string_lossy(), RgbImage::new(2, 4))
    }

    #[test]
    fn test_sidecar_path_beside_image() {
        let sidecars = SidecarLandmarks::beside_images();
        assert_eq!(
            sidecars.sidecar_path(Path::new("photos/alice.jpg")),
            PathBuf::from("photos/alice.landmarks.json")
        );
    }

    #[test]
    fn test_sidecar_path_in_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sidecars = SidecarLandmarks::in_dir(dir.path()).expect("dir exists");
        assert_eq!(
            sidecars.sidecar_path(Path::new("photos/alice.jpg")),
            dir.path().join("alice.landmarks.json")
        );
    }

    #[test]
    fn test_missing_dir_rejected() {
        assert!(SidecarLandmarks::in_dir("/nonexistent/landmarks").is_err());
    }

    #[test]
    fn test_missing_sidecar_is_no_posture() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sidecars = SidecarLandmarks::beside_images();

        let result = sidecars
            .detect(&image_at(&dir.path().join("alice.jpg")))
            .expect("missing sidecar is not an error");
        assert!(result.is_none());
    }

    #[test]
    fn test_reads_bare_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("alice.landmarks.json"),
            r#"[{"x": 0.5, "y": 0.1, "z": -0.1, "visibility": 0.9}]"#,
        )
        .expect("write sidecar");
        let mut sidecars = SidecarLandmarks::beside_images();

        let landmarks = sidecars
            .detect(&image_at(&dir.path().join("alice.jpg")))
            .expect("parse")
            .expect("landmarks present");
        assert_eq!(landmarks.len(), 1);
    }

    #[test]
    fn test_reads_document_form() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("bob.landmarks.json"),
            r#"{"landmarks": [{"x": 0.5, "y": 0.1}, {"x": 0.5, "y": 0.2}]}"#,
        )
        .expect("write sidecar");
        std::fs::write(dir.path().join("carol.landmarks.json"), r#"{"landmarks": null}"#)
            .expect("write sidecar");
        let mut sidecars = SidecarLandmarks::in_dir(dir.path()).expect("dir exists");

        let bob = sidecars
            .detect(&image_at(Path::new("elsewhere/bob.png")))
            .expect("parse");
        assert_eq!(bob.map(|l| l.len()), Some(2));

        let carol = sidecars
            .detect(&image_at(Path::new("elsewhere/carol.png")))
            .expect("parse");
        assert!(carol.is_none());
    }

    #[test]
    fn test_empty_array_is_no_posture() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("dave.landmarks.json"), "[]").expect("write sidecar");
        let mut sidecars = SidecarLandmarks::beside_images();

        let result = sidecars
            .detect(&image_at(&dir.path().join("dave.jpg")))
            .expect("parse");
        assert!(result.is_none());
    }

    #[test]
    fn test_null_sidecar_is_no_posture() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("frank.landmarks.json"), " null\n").expect("write sidecar");
        let mut sidecars = SidecarLandmarks::beside_images();

        let result = sidecars
            .detect(&image_at(&dir.path().join("frank.jpg")))
            .expect("null sidecar is not an error");
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_sidecar_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("erin.landmarks.json"), "{not json").expect("write sidecar");
        let mut sidecars = SidecarLandmarks::beside_images();

        let err = sidecars
            .detect(&image_at(&dir.path().join("erin.jpg")))
            .expect_err("malformed");
        assert!(format!("{err:#}").contains("Malformed landmark sidecar"));
    }
}
