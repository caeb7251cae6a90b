//! Configuration file support for fullbody-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/fullbody-qa/config.toml` (lowest priority)
//! - Project-local: `.fullbody-qa.toml` (searched up directory tree)
//! - `FULLBODY_*` environment variables
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};
use std::str::FromStr;

use fullbody_qa_core::{CheckFlags, PoseBackend, ThresholdConfig};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Approval minimums.
    pub thresholds: ThresholdsConfig,
    /// Pose estimator selection.
    pub pose: PoseConfig,
    /// Default per-request checks.
    pub checks: ChecksConfig,
    /// Model settings.
    pub models: ModelsConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Overrides for the approval minimums. Unset values keep the defaults.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub min_width: Option<u32>,
    pub min_height: Option<u32>,
    pub min_aspect_ratio: Option<f64>,
    pub min_blur_score: Option<f64>,
    pub min_brightness: Option<f64>,
    pub min_body_coverage: Option<f64>,
    pub min_frontal_score: Option<f64>,
    pub min_landmark_confidence: Option<f64>,
}

/// Pose estimator configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// `geometric` or `landmark` (aliases `heuristic`, `landmarks`, `mediapipe`).
    pub backend: Option<String>,
    /// Directory holding landmark sidecars, instead of next to each image.
    pub landmarks_dir: Option<PathBuf>,
}

/// Default check flags.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ChecksConfig {
    pub require_feet_visible: Option<bool>,
}

/// Model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Custom models directory path.
    pub dir: Option<PathBuf>,
    /// Explicit face detector weights, overriding the models directory.
    pub face_model: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl ThresholdsConfig {
    /// Applies the set values on top of `base`.
    #[must_use]
    pub fn apply(&self, base: ThresholdConfig) -> ThresholdConfig {
        ThresholdConfig {
            min_width: self.min_width.unwrap_or(base.min_width),
            min_height: self.min_height.unwrap_or(base.min_height),
            min_aspect_ratio: self.min_aspect_ratio.unwrap_or(base.min_aspect_ratio),
            min_blur_score: self.min_blur_score.unwrap_or(base.min_blur_score),
            min_brightness: self.min_brightness.unwrap_or(base.min_brightness),
            min_body_coverage: self.min_body_coverage.unwrap_or(base.min_body_coverage),
            min_frontal_score: self.min_frontal_score.unwrap_or(base.min_frontal_score),
            min_landmark_confidence: self
                .min_landmark_confidence
                .unwrap_or(base.min_landmark_confidence),
        }
    }

    fn merge(&mut self, other: Self) {
        self.min_width = other.min_width.or(self.min_width);
        self.min_height = other.min_height.or(self.min_height);
        self.min_aspect_ratio = other.min_aspect_ratio.or(self.min_aspect_ratio);
        self.min_blur_score = other.min_blur_score.or(self.min_blur_score);
        self.min_brightness = other.min_brightness.or(self.min_brightness);
        self.min_body_coverage = other.min_body_coverage.or(self.min_body_coverage);
        self.min_frontal_score = other.min_frontal_score.or(self.min_frontal_score);
        self.min_landmark_confidence = other
            .min_landmark_confidence
            .or(self.min_landmark_confidence);
    }
}

impl ChecksConfig {
    #[must_use]
    pub const fn flags(&self) -> CheckFlags {
        CheckFlags {
            require_feet_visible: self.require_feet_visible,
        }
    }
}

impl AppConfig {
    /// Load configuration from XDG and project-local files, then the
    /// environment.
    ///
    /// Missing files are silently ignored. Invalid values are reported and
    /// replaced by their defaults.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        config.apply_env(|key| std::env::var(key).ok());

        for problem in config.sanitize() {
            eprintln!("warning: {problem}; using the default");
        }

        config
    }

    /// The configured backend, if any and parseable.
    #[must_use]
    pub fn backend(&self) -> Option<PoseBackend> {
        self.pose.backend.as_deref().and_then(|b| b.parse().ok())
    }

    /// Drops out-of-range values so their defaults apply.
    ///
    /// Returns one message per dropped value.
    fn sanitize(&mut self) -> Vec<String> {
        let mut problems = Vec::new();
        let t = &mut self.thresholds;

        let unit = [
            ("thresholds.min_brightness", &mut t.min_brightness),
            ("thresholds.min_body_coverage", &mut t.min_body_coverage),
            ("thresholds.min_frontal_score", &mut t.min_frontal_score),
            ("thresholds.min_landmark_confidence", &mut t.min_landmark_confidence),
        ];
        for (key, value) in unit {
            if let Some(v) = *value {
                if !(0.0..=1.0).contains(&v) {
                    problems.push(format!("{key} must be 0.0-1.0, got {v}"));
                    *value = None;
                }
            }
        }

        let non_negative = [
            ("thresholds.min_aspect_ratio", &mut t.min_aspect_ratio),
            ("thresholds.min_blur_score", &mut t.min_blur_score),
        ];
        for (key, value) in non_negative {
            if let Some(v) = *value {
                if v.is_nan() || v < 0.0 {
                    problems.push(format!("{key} must be non-negative, got {v}"));
                    *value = None;
                }
            }
        }

        if let Some(b) = self.pose.backend.take() {
            match PoseBackend::from_str(&b) {
                Ok(_) => self.pose.backend = Some(b),
                Err(e) => problems.push(format!("pose.backend: {e}")),
            }
        }

        if let Some(f) = self.output.format.take() {
            if f == "json" || f == "jsonl" {
                self.output.format = Some(f);
            } else {
                problems.push(format!("output.format must be 'json' or 'jsonl', got '{f}'"));
            }
        }

        problems
    }

    /// Applies `FULLBODY_*` overrides. Unparseable values are ignored.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
            let raw = lookup(key)?;
            match raw.trim().parse() {
                Ok(value) => {
                    debug!("{key} overrides config");
                    Some(value)
                }
                Err(_) => {
                    warn!("Ignoring {key}: cannot parse {raw:?}");
                    None
                }
            }
        }

        let t = &mut self.thresholds;
        t.min_width = parsed(&lookup, "FULLBODY_MIN_WIDTH").or(t.min_width);
        t.min_height = parsed(&lookup, "FULLBODY_MIN_HEIGHT").or(t.min_height);
        t.min_aspect_ratio = parsed(&lookup, "FULLBODY_MIN_ASPECT_RATIO").or(t.min_aspect_ratio);
        t.min_blur_score = parsed(&lookup, "FULLBODY_MIN_BLUR_SCORE").or(t.min_blur_score);
        t.min_brightness = parsed(&lookup, "FULLBODY_MIN_BRIGHTNESS").or(t.min_brightness);
        t.min_body_coverage =
            parsed(&lookup, "FULLBODY_MIN_BODY_COVERAGE").or(t.min_body_coverage);
        t.min_frontal_score =
            parsed(&lookup, "FULLBODY_MIN_FRONTAL_SCORE").or(t.min_frontal_score);
        t.min_landmark_confidence =
            parsed(&lookup, "FULLBODY_MIN_LANDMARK_CONFIDENCE").or(t.min_landmark_confidence);

        if let Some(backend) = parsed::<PoseBackend>(&lookup, "FULLBODY_POSE_BACKEND") {
            self.pose.backend = Some(backend.as_str().to_string());
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        self.thresholds.merge(other.thresholds);

        self.pose.backend = other.pose.backend.or_else(|| self.pose.backend.take());
        self.pose.landmarks_dir = other
            .pose
            .landmarks_dir
            .or_else(|| self.pose.landmarks_dir.take());

        self.checks.require_feet_visible = other
            .checks
            .require_feet_visible
            .or(self.checks.require_feet_visible);

        self.models.dir = other.models.dir.or_else(|| self.models.dir.take());
        self.models.face_model = other
            .models
            .face_model
            .or_else(|| self.models.face_model.take());

        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fullbody-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.fullbody-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".fullbody-qa.toml"))
        .find(|path| path.exists())
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}
