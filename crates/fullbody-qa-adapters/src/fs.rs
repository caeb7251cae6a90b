//! Filesystem image source.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use fullbody_qa_core::ports::LoadFailure;
use fullbody_qa_core::{ImageInfo, ImageSource};
use tracing::{debug, warn};

/// Extensions the decoder is built for.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// Reads images from files and directories.
///
/// Directory contents are visited in sorted order so batch output is stable.
pub struct FsImageSource {
    paths: Vec<PathBuf>,
    recursive: bool,
}

impl FsImageSource {
    /// Creates a source over `paths` (files or directories).
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>, recursive: bool) -> Self {
        Self { paths, recursive }
    }

    fn collect_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for path in &self.paths {
            if path.is_dir() {
                self.scan_dir(path, &mut files);
            } else {
                // Named files are decoded regardless of extension. A named
                // path that does not exist still yields a load failure.
                files.push(path.clone());
            }
        }

        files
    }

    fn scan_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
            Err(e) => {
                warn!("Failed to read directory {}: {e}", dir.display());
                return;
            }
        };
        entries.sort();

        for path in entries {
            if path.is_file() && is_image(&path) {
                files.push(path);
            } else if path.is_dir() && self.recursive {
                self.scan_dir(&path, files);
            }
        }
    }
}

impl ImageSource for FsImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = Result<ImageInfo, LoadFailure>> + Send + '_> {
        let files = self.collect_files();
        debug!("Found {} image files", files.len());

        Box::new(files.into_iter().map(|path| load_image(&path)))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.collect_files().len())
    }
}

/// Returns true if the extension is one the decoder handles.
#[must_use]
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(e)))
}

/// Decodes one file to RGB.
///
/// # Errors
///
/// Returns a [`LoadFailure`] carrying the path if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<ImageInfo, LoadFailure> {
    let label = path.to_string_lossy().into_owned();
    if !path.exists() {
        return Err(LoadFailure {
            path: label,
            error: anyhow!("Path does not exist: {}", path.display()),
        });
    }
    match image::open(path).with_context(|| format!("Failed to decode image: {}", path.display())) {
        Ok(image) => Ok(ImageInfo::new(label, image)),
        Err(error) => Err(LoadFailure { path: label, error }),
    }
}
