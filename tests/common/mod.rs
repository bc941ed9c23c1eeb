//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::Command;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Command for the roster binary with no environment overrides leaking in
pub fn roster_cmd() -> Command {
    let mut cmd = Command::cargo_bin("hogwarts-roster").unwrap();
    for var in [
        "ROSTER_CONFIG",
        "ROSTER_STUDENTS_URL",
        "ROSTER_FAMILIES_URL",
        "ROSTER_FILTER",
        "ROSTER_SORT",
        "ROSTER_DIRECTION",
        "ROSTER_LOG_LEVEL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Roster command reading the fixture documents
pub fn fixture_cmd(subcommand: &str) -> Command {
    let mut cmd = roster_cmd();
    cmd.arg(subcommand)
        .arg("--students-url")
        .arg(fixture_path("students.json"))
        .arg("--families-url")
        .arg(fixture_path("families.json"));
    cmd
}
