//! Model weight locations.
//!
//! Weights are installed by hand into the models directory; nothing is
//! downloaded at runtime.

use std::path::{Path, PathBuf};

/// A model the validator knows how to load.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    /// Short name used on the command line.
    pub name: &'static str,
    /// File name inside the models directory.
    pub filename: &'static str,
    /// What the model is used for.
    pub purpose: &'static str,
}

/// Known models.
pub const MODELS: &[ModelInfo] = &[ModelInfo {
    name: "blazeface",
    filename: "blazeface.safetensors",
    purpose: "face counting for group photo detection",
}];

/// Default models directory.
///
/// `XDG_DATA_HOME/fullbody-qa/models`, falling back to
/// `~/.local/share/fullbody-qa/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fullbody-qa")
        .join("models")
}

/// Path of a known model inside `dir`.
#[must_use]
pub fn model_path_in(dir: &Path, name: &str) -> Option<PathBuf> {
    MODELS
        .iter()
        .find(|m| m.name == name)
        .map(|m| dir.join(m.filename))
}

/// Installation status of a known model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStatus {
    pub name: &'static str,
    pub path: PathBuf,
    pub installed: bool,
}

/// Reports which known models are present in `dir`.
#[must_use]
pub fn list_models(dir: &Path) -> Vec<ModelStatus> {
    MODELS
        .iter()
        .map(|m| {
            let path = dir.join(m.filename);
            ModelStatus {
                name: m.name,
                installed: path.is_file(),
                path,
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_models_dir() {
        assert!(models_dir().ends_with("fullbody-qa/models"));
    }

    #[test]
    fn test_model_path_in() {
        let path = model_path_in(Path::new("/opt/models"), "blazeface").expect("known model");
        assert_eq!(path, Path::new("/opt/models/blazeface.safetensors"));
    }

    #[test]
    fn test_model_path_unknown() {
        assert!(model_path_in(&models_dir(), "retinaface").is_none());
    }

    #[test]
    fn test_list_models_reports_installed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let before = list_models(dir.path());
        assert_eq!(before.len(), MODELS.len());
        assert!(before.iter().all(|m| !m.installed));

        std::fs::write(dir.path().join("blazeface.safetensors"), b"weights").expect("write");
        let after = list_models(dir.path());
        assert!(after.iter().any(|m| m.name == "blazeface" && m.installed));
    }
}
