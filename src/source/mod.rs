//! Roster data sources
//!
//! A source delivers the two documents a roster is built from:
//! - the student list: `[{ "fullname", "house", "gender" }]`
//! - the family lists: `{ "half": [..], "pure": [..] }`
//!
//! Both are fetched concurrently; if either fails the whole load fails.

mod document;

pub use document::DocumentSource;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::roster::{FamilyLists, ImageLayout, RawStudent, Student};

// ─────────────────────────────────────────────────────────────────
// Location
// ─────────────────────────────────────────────────────────────────

/// Where a document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// `http://` or `https://` URL
    Remote(Url),
    /// Local file, given as a path or a `file://` URL
    Local(PathBuf),
}

impl Location {
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::invalid_argument(
                "source location",
                value,
                "location cannot be empty",
            ));
        }

        match Url::parse(value) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Location::Remote(url)),
                "file" => url.to_file_path().map(Location::Local).map_err(|_| {
                    Error::invalid_argument("source location", value, "not a valid file URL")
                }),
                // Windows drive letters parse as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(Location::Local(PathBuf::from(value))),
                scheme => Err(Error::invalid_argument(
                    "source location",
                    value,
                    format!("unsupported scheme '{}', use http(s), file or a path", scheme),
                )),
            },
            Err(_) => Ok(Location::Local(PathBuf::from(
                shellexpand::tilde(value).into_owned(),
            ))),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Remote(url) => write!(f, "{}", url),
            Location::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Location::parse(s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Source trait
// ─────────────────────────────────────────────────────────────────

/// Provider of the raw roster documents
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Short description for logs
    fn describe(&self) -> String;

    /// Fetch the student list
    async fn students(&self) -> Result<Vec<RawStudent>>;

    /// Fetch the family lists
    async fn families(&self) -> Result<FamilyLists>;
}

/// Fetch both documents and build the students, in source order.
///
/// Records whose full name is blank are skipped with a warning.
pub async fn load(source: &dyn RosterSource, images: &ImageLayout) -> Result<Vec<Student>> {
    info!(source = %source.describe(), "Loading student data");

    let (raw_students, families) = tokio::try_join!(source.students(), source.families())?;

    let total = raw_students.len();
    let students: Vec<Student> = raw_students
        .iter()
        .filter(|raw| {
            let valid = !raw.fullname.trim().is_empty();
            if !valid {
                warn!(house = %raw.house, "Skipping student record with an empty name");
            }
            valid
        })
        .map(|raw| Student::build(raw, &families, images))
        .collect();

    info!(
        loaded = students.len(),
        skipped = total - students.len(),
        half_blood_families = families.half.len(),
        pure_blood_families = families.pure.len(),
        "Loaded students successfully"
    );

    Ok(students)
}
