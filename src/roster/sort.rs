//! Sort engine: stable ordering of students by a field and direction.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::student::Student;
use crate::error::Error;

/// Field a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    FirstName,
    MiddleName,
    LastName,
    NickName,
    House,
    BloodStatus,
    Gender,
}

impl SortKey {
    /// Slug used in config files and CLI args.
    pub fn slug(&self) -> &'static str {
        match self {
            SortKey::FirstName => "first-name",
            SortKey::MiddleName => "middle-name",
            SortKey::LastName => "last-name",
            SortKey::NickName => "nick-name",
            SortKey::House => "house",
            SortKey::BloodStatus => "blood-status",
            SortKey::Gender => "gender",
        }
    }

    pub fn all() -> &'static [SortKey] {
        &[
            SortKey::FirstName,
            SortKey::MiddleName,
            SortKey::LastName,
            SortKey::NickName,
            SortKey::House,
            SortKey::BloodStatus,
            SortKey::Gender,
        ]
    }

    /// Field value used for comparison. `None` sorts before any value.
    fn value<'a>(&self, student: &'a Student) -> Option<&'a str> {
        match self {
            SortKey::FirstName => Some(student.first_name.as_str()),
            SortKey::MiddleName => student.middle_name.as_deref(),
            SortKey::LastName => student.last_name.as_deref(),
            SortKey::NickName => student.nick_name.as_deref(),
            SortKey::House => Some(student.house.as_str()),
            SortKey::BloodStatus => Some(student.blood_status.label()),
            SortKey::Gender => Some(student.gender.as_str()),
        }
    }

    /// Three-way comparison of two students on this field
    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        self.value(a).cmp(&self.value(b))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "firstname" | "first" => Ok(SortKey::FirstName),
            "middlename" | "middle" => Ok(SortKey::MiddleName),
            "lastname" | "last" => Ok(SortKey::LastName),
            "nickname" | "nick" => Ok(SortKey::NickName),
            "house" => Ok(SortKey::House),
            "bloodstatus" | "bloodtype" | "blood" => Ok(SortKey::BloodStatus),
            "gender" => Ok(SortKey::Gender),
            _ => Err(Error::invalid_argument(
                "sort key",
                s,
                format!(
                    "valid keys: {}",
                    SortKey::all()
                        .iter()
                        .map(|k| k.slug())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flipped(&self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "asc"),
            Direction::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Asc),
            "desc" | "descending" => Ok(Direction::Desc),
            _ => Err(Error::invalid_argument(
                "sort direction",
                s,
                "expected 'asc' or 'desc'",
            )),
        }
    }
}

/// Sort key plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: Direction,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: Direction) -> Self {
        Self { key, direction }
    }

    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        let ordering = self.key.compare(a, b);
        match self.direction {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::LastName, Direction::Asc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.direction)
    }
}

/// Return a sorted copy of `students`. Equal keys keep their input order.
pub fn sort<'a>(students: &[&'a Student], spec: SortSpec) -> Vec<&'a Student> {
    let mut sorted = students.to_vec();
    // slice::sort_by is stable
    sorted.sort_by(|a, b| spec.compare(a, b));
    sorted
}
