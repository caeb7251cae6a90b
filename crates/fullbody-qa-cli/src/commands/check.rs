//! Check command - validate images.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use fullbody_qa_adapters::{model_path_in, models_dir, FsImageSource, SidecarLandmarks};
use fullbody_qa_core::inference::{BlazeFace, ModelSlot, DEFAULT_MIN_CONFIDENCE};
use fullbody_qa_core::modules::{create_estimator, FaceSlot, LandmarkModels, LandmarkSlot};
use fullbody_qa_core::{
    CheckFlags, FaceCounter, ImageSource, LandmarkDetector, PoseBackend, ProgressEvent,
    ProgressSink, ResultOutput, ThresholdConfig, ValidationRecord, Validator,
};
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::{AppConfig, ThresholdsConfig};
use crate::output::{JsonOutput, ProgressBar};

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Parse a score bounded to 0.0-1.0.
fn parse_unit(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse an unbounded, non-negative minimum.
fn parse_non_negative(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} is negative"))
    }
}

fn parse_backend(s: &str) -> Result<PoseBackend, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

fn parse_checks(s: &str) -> Result<CheckFlags, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid checks JSON: {e}"))
}

/// Shared arguments for image validation.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct CheckArgs {
    /// Files or directories to validate
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Minimum width in pixels
    #[arg(long, value_name = "PX")]
    pub min_width: Option<u32>,

    /// Minimum height in pixels
    #[arg(long, value_name = "PX")]
    pub min_height: Option<u32>,

    /// Minimum height/width ratio
    #[arg(long, value_parser = parse_non_negative)]
    pub min_aspect_ratio: Option<f64>,

    /// Minimum gradient-variance blur score
    #[arg(long, value_parser = parse_non_negative)]
    pub min_blur_score: Option<f64>,

    /// Minimum mean brightness (0.0-1.0)
    #[arg(long, value_parser = parse_unit)]
    pub min_brightness: Option<f64>,

    /// Minimum body coverage (0.0-1.0)
    #[arg(long, value_parser = parse_unit)]
    pub min_body_coverage: Option<f64>,

    /// Minimum frontal score (0.0-1.0)
    #[arg(long, value_parser = parse_unit)]
    pub min_frontal_score: Option<f64>,

    /// Minimum landmark confidence (0.0-1.0)
    #[arg(long, value_parser = parse_unit)]
    pub min_landmark_confidence: Option<f64>,

    /// Pose backend: geometric (default) or landmark
    ///
    /// `geometric` scores the frame shape alone and needs no model output,
    /// which makes it the default. `landmark` (alias `mediapipe`) is the
    /// stricter gate: it reads `<stem>.landmarks.json` sidecars written by an
    /// external pose model, plus face counts from the optional face model.
    /// Images without a sidecar are rejected as `no_person_detected`.
    #[arg(long, value_parser = parse_backend)]
    pub backend: Option<PoseBackend>,

    /// Directory holding `<stem>.landmarks.json` sidecars (default: next to each image)
    #[arg(long, value_name = "DIR")]
    pub landmarks_dir: Option<PathBuf>,

    /// Face detector weights (default: blazeface.safetensors in the models directory)
    #[arg(long, value_name = "FILE")]
    pub face_model: Option<PathBuf>,

    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR")]
    pub models_dir: Option<PathBuf>,

    /// Check flags as JSON, e.g. '{"requireFeetVisible":false}'
    #[arg(long, value_name = "JSON", value_parser = parse_checks)]
    pub checks: Option<CheckFlags>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl CheckArgs {
    /// Apply configuration values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local), then `FULLBODY_*`
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        let t = &config.thresholds;
        args.min_width = args.min_width.or(t.min_width);
        args.min_height = args.min_height.or(t.min_height);
        args.min_aspect_ratio = args.min_aspect_ratio.or(t.min_aspect_ratio);
        args.min_blur_score = args.min_blur_score.or(t.min_blur_score);
        args.min_brightness = args.min_brightness.or(t.min_brightness);
        args.min_body_coverage = args.min_body_coverage.or(t.min_body_coverage);
        args.min_frontal_score = args.min_frontal_score.or(t.min_frontal_score);
        args.min_landmark_confidence = args
            .min_landmark_confidence
            .or(t.min_landmark_confidence);

        args.backend = args.backend.or_else(|| config.backend());
        if args.landmarks_dir.is_none() {
            args.landmarks_dir.clone_from(&config.pose.landmarks_dir);
        }

        // Individual flags from --checks win over the config's defaults.
        let from_config = config.checks.flags();
        args.checks = Some(from_config.overridden_by(args.checks.unwrap_or_default()));

        if args.face_model.is_none() {
            args.face_model.clone_from(&config.models.face_model);
        }
        if args.models_dir.is_none() {
            args.models_dir.clone_from(&config.models.dir);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Effective thresholds over the hardcoded defaults.
    fn thresholds(&self) -> ThresholdConfig {
        ThresholdsConfig {
            min_width: self.min_width,
            min_height: self.min_height,
            min_aspect_ratio: self.min_aspect_ratio,
            min_blur_score: self.min_blur_score,
            min_brightness: self.min_brightness,
            min_body_coverage: self.min_body_coverage,
            min_frontal_score: self.min_frontal_score,
            min_landmark_confidence: self.min_landmark_confidence,
        }
        .apply(ThresholdConfig::default())
    }

    fn backend(&self) -> PoseBackend {
        self.backend.unwrap_or_default()
    }

    fn checks(&self) -> CheckFlags {
        self.checks.unwrap_or_default()
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    fn face_model_path(&self) -> Option<PathBuf> {
        self.face_model.clone().or_else(|| {
            let dir = self.models_dir.clone().unwrap_or_else(models_dir);
            model_path_in(&dir, "blazeface")
        })
    }
}

/// Result of running the check command.
pub struct CheckResult {
    /// Number of approved images.
    pub approved: usize,
    /// Number of rejected images, unreadable ones included.
    pub rejected: usize,
    /// Number of images that could not be decoded.
    pub unreadable: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let validator = build_validator(args);

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout();

    process_images(&source, &validator, &output, &progress_bar, args)
}

/// Builds the validator for the selected backend.
///
/// Landmark and face models load on first use; the geometric backend never
/// touches them.
fn build_validator(args: &CheckArgs) -> Validator {
    let backend = args.backend();
    let models = match backend {
        PoseBackend::Geometric => LandmarkModels::new(
            ModelSlot::unavailable("landmark", "not used by the geometric backend"),
            ModelSlot::unavailable("face", "not used by the geometric backend"),
        ),
        PoseBackend::Landmark => LandmarkModels::new(landmark_slot(args), face_slot(args)),
    };

    let thresholds = args.thresholds();
    debug!("Thresholds: {thresholds:?}");

    Validator::new(create_estimator(backend, models), thresholds)
        .with_default_checks(args.checks())
}

fn landmark_slot(args: &CheckArgs) -> LandmarkSlot {
    let dir = args.landmarks_dir.clone();
    ModelSlot::new("landmark", move || {
        let sidecars = match &dir {
            Some(dir) => SidecarLandmarks::in_dir(dir)?,
            None => SidecarLandmarks::beside_images(),
        };
        Ok(Box::new(sidecars) as Box<dyn LandmarkDetector>)
    })
}

fn face_slot(args: &CheckArgs) -> FaceSlot {
    let Some(path) = args.face_model_path() else {
        return ModelSlot::unavailable("face", "unknown model configuration");
    };

    if !path.is_file() {
        info!(
            "Face counting disabled: {} not found. Group photos are only caught by landmarks.",
            path.display()
        );
        return ModelSlot::unavailable("face", format!("{} not found", path.display()));
    }

    ModelSlot::new("face", move || {
        let model = BlazeFace::load(&path, DEFAULT_MIN_CONFIDENCE)?;
        Ok(Box::new(model) as Box<dyn FaceCounter>)
    })
}

/// Validate every image and write one record per input.
fn process_images(
    source: &FsImageSource,
    validator: &Validator,
    output: &JsonOutput,
    progress: &ProgressBar,
    args: &CheckArgs,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let checks = CheckFlags::default();
    let mut approved = 0usize;
    let mut rejected = 0usize;
    let mut unreadable = 0usize;
    let mut all_records: Vec<ValidationRecord> = Vec::new();

    for (index, item) in source.images().enumerate() {
        let (path, verdict) = match item {
            Ok(image) => {
                progress.on_event(ProgressEvent::Started {
                    path: image.path.clone(),
                    index,
                    total,
                });
                let verdict = validator.validate(&image, &checks);
                (image.path, verdict)
            }
            Err(failure) => {
                warn!("{}: {:#}", failure.path, failure.error);
                progress.on_event(ProgressEvent::Unreadable {
                    path: failure.path.clone(),
                    reason: format!("{:#}", failure.error),
                });
                unreadable += 1;
                (failure.path, validator.validate_request(None, &checks))
            }
        };

        if verdict.approved {
            approved += 1;
        } else {
            rejected += 1;
        }

        let record = ValidationRecord {
            path,
            timestamp: iso_timestamp(),
            verdict,
        };

        progress.on_event(ProgressEvent::Completed {
            record: record.clone(),
        });

        match args.format() {
            OutputFormat::Jsonl => output.write(&record)?,
            OutputFormat::Json => all_records.push(record),
        }
    }

    if matches!(args.format(), OutputFormat::Json) {
        output.write_array(&all_records, args.pretty)?;
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        approved,
        rejected,
        unreadable,
    });

    let exit_code = if rejected > 0 {
        ExitCode::Rejected
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        approved,
        rejected,
        unreadable,
        exit_code,
    })
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
