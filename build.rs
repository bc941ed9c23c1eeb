//! Build script for hogwarts-roster
//!
//! Stamps the binary with the git revision, build time, target and
//! compiler so `hogwarts-roster version` and the shell banner can report
//! which build loaded the roster.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let git_hash = run("git", &["rev-parse", "--short=8", "HEAD"]);
    let git_branch = run("git", &["rev-parse", "--abbrev-ref", "HEAD"]);
    let git_dirty = match Command::new("git").args(["status", "--porcelain"]).output() {
        Ok(output) if output.status.success() => (!output.stdout.is_empty()).to_string(),
        _ => "unknown".to_string(),
    };

    let stamps = [
        ("GIT_HASH", git_hash),
        ("GIT_BRANCH", git_branch),
        ("GIT_DIRTY", git_dirty),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        ),
        ("TARGET", cargo_var("TARGET")),
        ("PROFILE", cargo_var("PROFILE")),
        ("HOST", cargo_var("HOST")),
        ("RUSTC_VERSION", run("rustc", &["--version"])),
    ];

    for (name, value) in &stamps {
        println!("cargo:rustc-env=ROSTER_{}={}", name, value);
    }
}

/// Trimmed stdout of a successful command, or "unknown"
fn run(program: &str, args: &[&str]) -> String {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn cargo_var(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| "unknown".to_string())
}
