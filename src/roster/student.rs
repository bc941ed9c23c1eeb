//! Student records and the builder that derives them from raw source data.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::names::{capitalize, capitalize_field};

// ─────────────────────────────────────────────────────────────────
// Raw source records
// ─────────────────────────────────────────────────────────────────

/// One entry of the student document as published by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStudent {
    pub fullname: String,
    pub house: String,
    pub gender: String,
}

/// Family name lists used to classify blood status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyLists {
    #[serde(default)]
    pub half: Vec<String>,
    #[serde(default)]
    pub pure: Vec<String>,
}

impl FamilyLists {
    fn contains(list: &[String], last_name: &str) -> bool {
        list.iter().any(|name| name.trim().eq_ignore_ascii_case(last_name))
    }

    /// Classify a last name. Half-blood lists are checked first.
    pub fn classify(&self, last_name: Option<&str>) -> BloodStatus {
        match last_name {
            Some(name) if Self::contains(&self.half, name) => BloodStatus::HalfBlood,
            Some(name) if Self::contains(&self.pure, name) => BloodStatus::PureBlood,
            _ => BloodStatus::Muggle,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Blood Status
// ─────────────────────────────────────────────────────────────────

/// Derived classification of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BloodStatus {
    HalfBlood,
    PureBlood,
    Muggle,
}

impl BloodStatus {
    /// Slug used by filters and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            BloodStatus::HalfBlood => "half-blood",
            BloodStatus::PureBlood => "pure-blood",
            BloodStatus::Muggle => "muggle",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            BloodStatus::HalfBlood => "Half-Blood",
            BloodStatus::PureBlood => "Pure-Blood",
            BloodStatus::Muggle => "Muggle",
        }
    }

    /// All statuses in display order.
    pub fn all() -> &'static [BloodStatus] {
        &[BloodStatus::PureBlood, BloodStatus::HalfBlood, BloodStatus::Muggle]
    }
}

impl fmt::Display for BloodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for BloodStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "half-blood" | "halfblood" | "half" => Ok(BloodStatus::HalfBlood),
            "pure-blood" | "pureblood" | "pure" => Ok(BloodStatus::PureBlood),
            "muggle" | "common" => Ok(BloodStatus::Muggle),
            _ => Err(format!(
                "Unknown blood status '{}'. Valid: pure-blood, half-blood, muggle",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Student
// ─────────────────────────────────────────────────────────────────

/// Position of a student in fetch order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub usize);

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// House whose members may always join the Inquisitorial Squad
pub const SQUAD_HOUSE: &str = "Slytherin";

/// Maximum number of prefects per house
pub const PREFECTS_PER_HOUSE: usize = 2;

/// A tracked student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub nick_name: Option<String>,
    pub house: String,
    pub gender: String,
    pub image: String,
    pub blood_status: BloodStatus,
    pub prefect: bool,
    pub squad: bool,
    pub expelled: bool,
}

/// Where portraits live and how they are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayout {
    pub dir: String,
}

impl Default for ImageLayout {
    fn default() -> Self {
        Self {
            dir: "images".to_string(),
        }
    }
}

impl ImageLayout {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a file inside the image directory.
    pub fn resolve(&self, file: &str) -> String {
        let dir = self.dir.trim_end_matches('/');
        if dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", dir, file)
        }
    }

    /// Portrait file for a student with the given names.
    pub fn portrait(&self, first_name: &str, last_name: Option<&str>) -> String {
        let file = match (first_name, last_name) {
            (_, Some("Finch-Fletchley")) => "fletchley_j.png".to_string(),
            ("Padma", _) => "patil_padma.png".to_string(),
            ("Parvati", _) => "patil_parvati.png".to_string(),
            (first, None) => format!("{}.png", first.to_lowercase()),
            (first, Some(last)) if last.eq_ignore_ascii_case("null") => {
                format!("{}.png", first.to_lowercase())
            }
            (first, Some(last)) => {
                let initial = first
                    .to_lowercase()
                    .chars()
                    .next()
                    .map(String::from)
                    .unwrap_or_default();
                format!("{}_{}.png", last.to_lowercase(), initial)
            }
        };
        self.resolve(&file)
    }

    /// Crest image shown on a house's detail card.
    pub fn crest(&self, house: &str) -> String {
        self.resolve(&format!("{}_crest.png", house.to_lowercase()))
    }
}

impl Student {
    /// Build a student from a raw source record.
    ///
    /// `raw.fullname` must contain at least one non-whitespace token; the
    /// loader skips records that do not.
    pub fn build(raw: &RawStudent, families: &FamilyLists, images: &ImageLayout) -> Self {
        let parts: Vec<&str> = raw.fullname.split_whitespace().collect();

        let first_name = capitalize(parts.first().copied()).unwrap_or_default();
        let mut middle_name = None;
        let mut nick_name = None;
        let mut last_name = None;

        match parts.len() {
            3 => {
                let middle = parts[1];
                if middle.len() >= 2 && middle.starts_with('"') && middle.ends_with('"') {
                    nick_name = capitalize(Some(&middle[1..middle.len() - 1]));
                } else {
                    middle_name = capitalize(Some(middle));
                }
                last_name = capitalize(Some(parts[2]));
            }
            n if n >= 2 => {
                last_name = capitalize(Some(parts[1]));
            }
            _ => {}
        }

        let image = images.portrait(&first_name, last_name.as_deref());
        let blood_status = families.classify(last_name.as_deref());

        Self {
            id: StudentId::default(),
            first_name,
            middle_name,
            last_name,
            nick_name,
            house: capitalize_field(&raw.house),
            gender: capitalize_field(&raw.gender),
            image,
            blood_status,
            prefect: false,
            squad: false,
            expelled: false,
        }
    }

    /// First and last name joined for display
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    /// Every name part in reading order, with the nickname quoted
    pub fn full_name(&self) -> String {
        let mut name = self.first_name.clone();
        if let Some(nick) = &self.nick_name {
            name.push_str(&format!(" \"{}\"", nick));
        }
        for part in [&self.middle_name, &self.last_name].into_iter().flatten() {
            name.push(' ');
            name.push_str(part);
        }
        name
    }

    /// Whether this student may be in the Inquisitorial Squad
    pub fn squad_eligible(&self) -> bool {
        self.blood_status == BloodStatus::PureBlood || self.house == SQUAD_HOUSE
    }

    /// Whether any of the name parts contains `needle` (already lowercased)
    pub fn name_contains(&self, needle: &str) -> bool {
        [
            Some(self.first_name.as_str()),
            self.last_name.as_deref(),
            self.nick_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|name| name.to_lowercase().contains(needle))
    }
}
