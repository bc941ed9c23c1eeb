//! Which build of the roster manager is running
//!
//! `build.rs` stamps the values below as `ROSTER_*` compile-time env vars.
//! They show up in `hogwarts-roster version`, the shell banner and the
//! startup log line.

use std::fmt;

/// Build stamps of this binary
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub authors: &'static str,
    /// Short git hash, "unknown" outside a checkout
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    git_dirty: &'static str,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub host: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            authors: env!("CARGO_PKG_AUTHORS"),
            git_hash: env!("ROSTER_GIT_HASH"),
            git_branch: env!("ROSTER_GIT_BRANCH"),
            git_dirty: env!("ROSTER_GIT_DIRTY"),
            build_timestamp: env!("ROSTER_BUILD_TIMESTAMP"),
            target: env!("ROSTER_TARGET"),
            host: env!("ROSTER_HOST"),
            profile: env!("ROSTER_PROFILE"),
            rustc_version: env!("ROSTER_RUSTC_VERSION"),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.git_dirty == "true"
    }

    /// Version with git hash, e.g. "0.1.0-1a2b3c4d" or "0.1.0-1a2b3c4d-dirty".
    /// Logged when a roster command starts.
    pub fn full_version(&self) -> String {
        let dirty = if self.is_dirty() { "-dirty" } else { "" };
        format!("{}-{}{}", self.version, self.git_hash, dirty)
    }

    /// Banner form, e.g. "0.1.0 (1a2b3c4d)"
    pub fn short_version(&self) -> String {
        format!("{} ({})", self.version, self.git_hash)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("Version", self.version.to_string()),
            ("Authors", self.authors.to_string()),
            (
                "Git Hash",
                format!("{}{}", self.git_hash, if self.is_dirty() { " (dirty)" } else { "" }),
            ),
            ("Git Branch", self.git_branch.to_string()),
            ("Built", self.build_timestamp.to_string()),
            ("Profile", self.profile.to_string()),
            ("Target", self.target.to_string()),
            ("Host", self.host.to_string()),
            ("Compiler", self.rustc_version.to_string()),
        ];

        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        for (label, value) in rows.iter().filter(|(_, value)| !value.is_empty()) {
            writeln!(f, "  {:<12}{}", format!("{}:", label), value)?;
        }
        Ok(())
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

/// `hogwarts-roster version`
pub fn print_version() {
    print!("{}", build_info());
}
