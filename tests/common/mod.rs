//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get an amv command isolated from user configuration
pub fn amv() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("amv"));
    cmd.env_remove("AMV_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// The fully filled-in assay snapshot shipped in demos/
pub fn demo_inputs() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/assay.yaml")
}

/// Copy the demo snapshot into a fresh temp directory
pub fn setup_demo() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("inputs.yaml");
    std::fs::copy(demo_inputs(), &path).unwrap();
    (tmp, path)
}

/// Write an input snapshot into a fresh temp directory
pub fn write_inputs(content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("inputs.yaml");
    std::fs::write(&path, content).unwrap();
    (tmp, path)
}

/// Run `amv run -o json` and parse the dataset
pub fn run_json(dir: &Path, file: &Path) -> serde_json::Value {
    let output = amv()
        .current_dir(dir)
        .args(["run", "-o", "json"])
        .arg(file)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "amv run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Find a record by label in a section of a JSON dataset
pub fn record<'a>(dataset: &'a serde_json::Value, section: &str, label: &str) -> &'a serde_json::Value {
    dataset[section]["records"]
        .as_array()
        .and_then(|records| records.iter().find(|r| r["label"] == label))
        .unwrap_or_else(|| panic!("no record '{}' in {}", label, section))
}
