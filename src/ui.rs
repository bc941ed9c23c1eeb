//! Terminal presentation of listings, detail cards and counts
//!
//! Render functions return strings so the CLI and the shell decide where
//! they go. Every user-visible error goes through [`show_error`].

use std::path::Path;

use tracing::debug;

use crate::roster::{Counts, ImageLayout, SortSpec, Student};

const HEADERS: [&str; 8] = ["#", "First", "Middle", "Nick", "Last", "House", "Blood", "Roles"];

fn roles(student: &Student) -> String {
    let mut roles = Vec::new();
    if student.prefect {
        roles.push("Prefect");
    }
    if student.squad {
        roles.push("Squad");
    }
    if student.expelled {
        roles.push("Expelled");
    }
    if roles.is_empty() {
        "-".to_string()
    } else {
        roles.join(", ")
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Numbered table of students. Row numbers start at 1.
pub fn render_table(rows: &[&Student]) -> String {
    if rows.is_empty() {
        return "No students to show.\n".to_string();
    }

    let cells: Vec<[String; 8]> = rows
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            [
                (idx + 1).to_string(),
                s.first_name.clone(),
                or_dash(s.middle_name.as_deref()).to_string(),
                or_dash(s.nick_name.as_deref()).to_string(),
                or_dash(s.last_name.as_deref()).to_string(),
                s.house.clone(),
                s.blood_status.label().to_string(),
                roles(s),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[&str]| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(col, (value, width))| {
                if col == 0 {
                    format!("{:>width$}", value, width = width)
                } else {
                    format!("{:<width$}", value, width = width)
                }
            })
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(&HEADERS[..]);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in &cells {
        let values: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&line(&values[..]));
    }
    out
}

/// Titled listing with a summary line, as printed by `list` and the shell
pub fn render_listing(title: &str, sort: &SortSpec, rows: &[&Student], total: usize) -> String {
    format!(
        "{} (sorted by {})\n{}Showing {} of {} students\n",
        title,
        sort,
        render_table(rows),
        rows.len(),
        total
    )
}

/// Detail card for one student.
///
/// The portrait path is checked on disk; when it is missing the card shows
/// `placeholder` instead.
pub fn render_detail(student: &Student, images: &ImageLayout, placeholder: &str) -> String {
    let portrait = if Path::new(&student.image).exists() {
        student.image.clone()
    } else {
        debug!(image = %student.image, "Portrait not found, using placeholder");
        format!("{} (missing {})", placeholder, student.image)
    };

    let heading = student.full_name();

    let mut out = format!("{}\n{}\n", heading, "=".repeat(heading.chars().count()));
    let mut field = |label: &str, value: &str| {
        out.push_str(&format!("  {:<21}{}\n", format!("{}:", label), value));
    };

    field("First name", &student.first_name);
    field("Middle name", or_dash(student.middle_name.as_deref()));
    field("Nickname", or_dash(student.nick_name.as_deref()));
    field("Last name", or_dash(student.last_name.as_deref()));
    field("Gender", &student.gender);
    field("House", &student.house);
    field("House crest", &images.crest(&student.house));
    field("Blood status", student.blood_status.label());
    field("Prefect", yes_no(student.prefect));
    field("Inquisitorial Squad", yes_no(student.squad));
    field("Expelled", yes_no(student.expelled));
    field("Portrait", &portrait);
    out
}

/// Number of students each filter criterion would show
pub fn render_counts(counts: &Counts) -> String {
    let entries = counts.entries();
    let width = entries
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Students per filter\n");
    for (name, count) in entries {
        out.push_str(&format!("  {:<width$}  {:>4}\n", name, count, width = width));
    }
    out
}

/// Report a problem to the user on stderr
pub fn show_error(message: &str) {
    eprintln!("{}", message.trim_end());
}
