//! Filter engine: selects the students a listing shows.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::student::{BloodStatus, Student};

/// Filter criterion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Filter {
    /// Every student who has not been expelled
    #[default]
    All,
    /// Expelled students only
    Expelled,
    /// Active Inquisitorial Squad members
    Squad,
    /// Active prefects
    Prefects,
    /// Active students of a house or blood status (stored lowercased)
    Named(String),
}

impl Filter {
    /// Parse a criterion. Never fails: anything unrecognized becomes a
    /// named criterion that is resolved against the data when applied.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            "" | "all" => Filter::All,
            "expelled" => Filter::Expelled,
            "squad" | "inquisitorialsquad" | "inquisitorial-squad" => Filter::Squad,
            "prefects" | "prefect" => Filter::Prefects,
            _ => Filter::Named(value),
        }
    }

    /// Title shown above a listing, e.g. "GRYFFINDOR STUDENTS"
    pub fn title(&self) -> String {
        let name = match self {
            Filter::All => "ALL",
            Filter::Expelled => "EXPELLED",
            Filter::Squad => "INQUISITORIAL SQUAD",
            Filter::Prefects => "PREFECT",
            Filter::Named(value) => return format!("{} STUDENTS", value.to_uppercase()),
        };
        format!("{} STUDENTS", name)
    }

    /// Whether a single student passes this criterion.
    ///
    /// Named criteria are matched literally here; use [`filter`] to get the
    /// fallback for values nobody matches.
    pub fn matches(&self, student: &Student) -> bool {
        match self {
            Filter::All => !student.expelled,
            Filter::Expelled => student.expelled,
            Filter::Squad => student.squad && !student.expelled,
            Filter::Prefects => student.prefect && !student.expelled,
            Filter::Named(value) => !student.expelled && matches_named(student, value),
        }
    }

    /// Resolve a named criterion against the data: values that match no
    /// house and no blood status fall back to [`Filter::All`].
    pub fn resolve(&self, students: &[Student]) -> Filter {
        match self {
            Filter::Named(value) if !is_known(students, value) => {
                warn!(criterion = %value, "Unknown filter criterion, showing all students");
                Filter::All
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Expelled => write!(f, "expelled"),
            Filter::Squad => write!(f, "inquisitorialsquad"),
            Filter::Prefects => write!(f, "prefects"),
            Filter::Named(value) => write!(f, "{}", value),
        }
    }
}

impl FromStr for Filter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Filter::parse(s))
    }
}

fn matches_named(student: &Student, value: &str) -> bool {
    student.house.eq_ignore_ascii_case(value)
        || value
            .parse::<BloodStatus>()
            .map(|status| status == student.blood_status)
            .unwrap_or(false)
}

fn is_known(students: &[Student], value: &str) -> bool {
    value.parse::<BloodStatus>().is_ok()
        || students.iter().any(|s| s.house.eq_ignore_ascii_case(value))
}

/// Select the students passing `criterion`, preserving input order.
pub fn filter<'a>(students: &'a [Student], criterion: &Filter) -> Vec<&'a Student> {
    let criterion = criterion.resolve(students);
    students.iter().filter(|s| criterion.matches(s)).collect()
}
