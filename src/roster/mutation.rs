//! Role and expulsion changes applied to a single student.
//!
//! Every operation validates before touching anything: a [`Rejection`] means
//! no field changed. None of these recompute a roster view; callers run
//! [`crate::roster::Roster::refresh`] afterwards.

use thiserror::Error;
use tracing::info;

use super::student::{Student, StudentId, PREFECTS_PER_HOUSE};

/// Why a change was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The house already has its full share of prefects
    #[error("There are already two prefects in {house}.")]
    HouseFull { house: String },

    /// Neither pure-blood nor in Slytherin
    #[error("Only people of pure blood or in Slytherin can be members")]
    Ineligible,

    /// Expelled students cannot take on roles
    #[error("{name} has been expelled and cannot be given a role")]
    Expelled { name: String },

    /// Id does not refer to a student
    #[error("No student with id {0}")]
    UnknownStudent(StudentId),
}

/// What a successful change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PrefectAssigned,
    PrefectRemoved,
    SquadJoined,
    SquadLeft,
    Expelled,
}

impl Outcome {
    pub fn describe(&self, name: &str) -> String {
        match self {
            Outcome::PrefectAssigned => format!("{} is now a prefect", name),
            Outcome::PrefectRemoved => format!("{} is no longer a prefect", name),
            Outcome::SquadJoined => format!("{} joined the Inquisitorial Squad", name),
            Outcome::SquadLeft => format!("{} left the Inquisitorial Squad", name),
            Outcome::Expelled => format!("{} has been expelled", name),
        }
    }
}

fn lookup(students: &[Student], id: StudentId) -> Result<&Student, Rejection> {
    students.get(id.0).ok_or(Rejection::UnknownStudent(id))
}

fn ensure_active(student: &Student) -> Result<(), Rejection> {
    if student.expelled {
        return Err(Rejection::Expelled {
            name: student.display_name(),
        });
    }
    Ok(())
}

/// Make a student a prefect if the house has room.
pub fn assign_prefect(students: &mut [Student], id: StudentId) -> Result<Outcome, Rejection> {
    let student = lookup(students, id)?;
    ensure_active(student)?;
    if student.prefect {
        return Ok(Outcome::PrefectAssigned);
    }

    let house = student.house.clone();
    let prefects_in_house = students
        .iter()
        .filter(|s| s.house == house && s.prefect && !s.expelled)
        .count();

    if prefects_in_house >= PREFECTS_PER_HOUSE {
        return Err(Rejection::HouseFull { house });
    }

    students[id.0].prefect = true;
    Ok(Outcome::PrefectAssigned)
}

/// Clear the prefect flag. Always succeeds for a known student.
pub fn remove_prefect(students: &mut [Student], id: StudentId) -> Result<Outcome, Rejection> {
    lookup(students, id)?;
    students[id.0].prefect = false;
    Ok(Outcome::PrefectRemoved)
}

/// Remove the prefect flag when set, assign it otherwise.
pub fn toggle_prefect(students: &mut [Student], id: StudentId) -> Result<Outcome, Rejection> {
    if lookup(students, id)?.prefect {
        remove_prefect(students, id)
    } else {
        assign_prefect(students, id)
    }
}

/// Toggle Inquisitorial Squad membership for an eligible student.
pub fn toggle_squad(students: &mut [Student], id: StudentId) -> Result<Outcome, Rejection> {
    let student = lookup(students, id)?;
    ensure_active(student)?;
    if !student.squad_eligible() {
        return Err(Rejection::Ineligible);
    }

    let student = &mut students[id.0];
    student.squad = !student.squad;
    Ok(if student.squad {
        Outcome::SquadJoined
    } else {
        Outcome::SquadLeft
    })
}

/// Expel a student, dropping every role. There is no way back.
pub fn expel(students: &mut [Student], id: StudentId) -> Result<Outcome, Rejection> {
    lookup(students, id)?;
    let student = &mut students[id.0];
    student.expelled = true;
    student.prefect = false;
    student.squad = false;
    info!(student = %student.display_name(), "Expelled student");
    Ok(Outcome::Expelled)
}
