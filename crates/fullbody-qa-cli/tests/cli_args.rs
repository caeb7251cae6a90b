//! CLI argument validation tests.
//!
//! Tests command-line argument parsing, validation, and error handling.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use fullbody_qa_test_support::SyntheticImageBuilder;
use predicates::prelude::*;

/// Command isolated from the user's config, models and environment.
fn fullbody_qa(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fullbody-qa").unwrap();
    cmd.current_dir(home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env_remove("FULLBODY_POSE_BACKEND")
        .env_remove("FULLBODY_MIN_WIDTH")
        .env_remove("FULLBODY_MIN_HEIGHT");
    cmd
}

fn portrait(dir: &Path) -> PathBuf {
    let path = dir.join("portrait.png");
    SyntheticImageBuilder::save(&SyntheticImageBuilder::portrait(900, 1600), &path).unwrap();
    path
}

// === Missing/Invalid Path Tests ===

#[test]
fn test_missing_path_shows_error() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No paths specified"));
}

#[test]
fn test_nonexistent_path_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = fullbody_qa(home.path())
        .arg(home.path().join("missing.jpg"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let record: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert!(record["path"].as_str().unwrap().ends_with("missing.jpg"));
    assert_eq!(record["approved"], false);
    assert_eq!(record["reasons"], serde_json::json!(["no_person_detected"]));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
}

#[test]
fn test_nonexistent_path_next_to_good_image() {
    let home = tempfile::tempdir().unwrap();
    let image = portrait(home.path());

    let output = fullbody_qa(home.path())
        .arg(&image)
        .arg(home.path().join("missing.jpg"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let approvals: Vec<bool> = stdout
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).unwrap()["approved"] == true)
        .collect();
    assert_eq!(approvals, vec![true, false]);
}

#[test]
fn test_empty_directory() {
    let home = tempfile::tempdir().unwrap();
    let photos = home.path().join("photos");
    std::fs::create_dir(&photos).unwrap();

    fullbody_qa(home.path())
        .arg(&photos)
        .assert()
        .code(0)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_explicit_check_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let image = portrait(home.path());

    fullbody_qa(home.path())
        .arg("check")
        .arg("--quiet")
        .arg(&image)
        .assert()
        .code(0)
        .stdout(predicate::str::contains("\"approved\":true"));
}

// === Value Validation Tests ===

#[test]
fn test_invalid_format_rejected() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["--format", "xml", "a.jpg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("json").or(predicate::str::contains("jsonl")));
}

#[test]
fn test_unit_threshold_out_of_range_rejected() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["--min-brightness", "2.0", "a.jpg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("2 is not in 0.0..=1.0"));
}

#[test]
fn test_non_numeric_threshold_rejected() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["--min-blur-score", "sharp", "a.jpg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'sharp' is not a valid number"));
}

#[test]
fn test_unknown_backend_rejected() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["--backend", "openpose", "a.jpg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown pose backend"));
}

#[test]
fn test_backend_aliases_accepted() {
    let home = tempfile::tempdir().unwrap();
    let image = portrait(home.path());

    for alias in ["geometric", "heuristic", "GEOMETRIC"] {
        fullbody_qa(home.path())
            .args(["--quiet", "--backend", alias])
            .arg(&image)
            .assert()
            .code(0);
    }
}

#[test]
fn test_invalid_checks_json_rejected() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["--checks", "{requireFeetVisible", "a.jpg"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid checks JSON"));
}

// === Help and Version ===

#[test]
fn test_help_lists_options() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--backend")
                .and(predicate::str::contains("--min-body-coverage"))
                .and(predicate::str::contains("--checks"))
                .and(predicate::str::contains("models")),
        );
}

#[test]
fn test_help_explains_default_backend() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("geometric (default) or landmark"));

    fullbody_qa(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("needs no model output")
                .and(predicate::str::contains("landmarks.json")),
        );
}

#[test]
fn test_version() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// === Models Subcommand ===

#[test]
fn test_models_path_default() {
    let home = tempfile::tempdir().unwrap();
    let expected = home.path().join("data").join("fullbody-qa").join("models");

    fullbody_qa(home.path())
        .args(["models", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy()));
}

#[test]
fn test_models_path_override() {
    let home = tempfile::tempdir().unwrap();
    fullbody_qa(home.path())
        .args(["models", "--models-dir", "/opt/weights", "path"])
        .assert()
        .success()
        .stdout("/opt/weights\n");
}

#[test]
fn test_models_list_reports_installed() {
    let home = tempfile::tempdir().unwrap();
    let models = home.path().join("weights");
    std::fs::create_dir(&models).unwrap();

    fullbody_qa(home.path())
        .args(["models", "--models-dir"])
        .arg(&models)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 models installed"));

    std::fs::write(models.join("blazeface.safetensors"), b"weights").unwrap();
    fullbody_qa(home.path())
        .args(["models", "--models-dir"])
        .arg(&models)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 models installed"));
}
