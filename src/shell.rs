//! Interactive roster session
//!
//! Commands are read line by line. Rows refer to the most recently
//! displayed listing, numbered from 1. Searches are debounced: a search
//! runs once input has been quiet for the configured period, a newer
//! search replaces a pending one, and any other command (or end of input)
//! runs the pending search first.

use std::io::Write;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::roster::{
    Direction, Filter, ImageLayout, Outcome, Rejection, Roster, SortKey, SortSpec, StudentId,
};
use crate::ui;

const HELP: &str = "\
Commands:
  list                      show the current listing
  filter <criterion>        all, expelled, prefects, squad, a house or a blood status
  sort <key> [asc|desc]     first-name, middle-name, last-name, nick-name, house,
                            blood-status, gender (repeat a key to flip direction)
  search [term]             search first, last and nick names; no term clears
  show <row>                detail card for a row of the last listing
  prefect <row>             toggle prefect
  squad <row>               toggle Inquisitorial Squad membership
  expel <row>               expel a student (cannot be undone)
  counts                    students per filter
  help                      this text
  quit                      leave the shell
";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Filter(String),
    Sort {
        key: SortKey,
        direction: Option<Direction>,
    },
    Search(String),
    Show(usize),
    Prefect(usize),
    Squad(usize),
    Expel(usize),
    Counts,
    Help,
    Quit,
}

fn parse_row(command: &str, arg: &str) -> Result<usize> {
    match arg.trim().parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(Error::invalid_argument(
            "row",
            arg.trim(),
            format!("usage: {} <row>, where row is a number from the last listing", command),
        )),
    }
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "filter" => Command::Filter(rest.to_string()),
            "sort" => {
                let mut args = rest.split_whitespace();
                let key = args
                    .next()
                    .ok_or_else(|| {
                        Error::invalid_argument("sort key", "", "usage: sort <key> [asc|desc]")
                    })?
                    .parse::<SortKey>()?;
                let direction = args.next().map(str::parse::<Direction>).transpose()?;
                Command::Sort { key, direction }
            }
            "search" | "find" => Command::Search(rest.to_string()),
            "show" => Command::Show(parse_row("show", rest)?),
            "prefect" => Command::Prefect(parse_row("prefect", rest)?),
            "squad" => Command::Squad(parse_row("squad", rest)?),
            "expel" => Command::Expel(parse_row("expel", rest)?),
            "counts" => Command::Counts,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(Error::invalid_argument(
                    "command",
                    other,
                    "type 'help' for the list of commands",
                ))
            }
        };
        Ok(Some(command))
    }
}

/// What a command produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text for stdout
    Text(String),
    /// Message for the error path
    Problem(String),
    Quit,
}

/// Roster plus the rows of the last displayed listing
pub struct Session {
    roster: Roster,
    listing: Vec<StudentId>,
    max_search_len: usize,
    images: ImageLayout,
    placeholder: String,
}

impl Session {
    pub fn new(
        roster: Roster,
        max_search_len: usize,
        images: ImageLayout,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            roster,
            listing: Vec::new(),
            max_search_len,
            images,
            placeholder: placeholder.into(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run one command
    pub fn execute(&mut self, command: Command) -> Reply {
        debug!(?command, "Executing shell command");
        match command {
            Command::List => {
                self.roster.refresh();
                Reply::Text(self.current_listing())
            }
            Command::Filter(criterion) => {
                self.roster.set_filter(Filter::parse(&criterion));
                Reply::Text(self.current_listing())
            }
            Command::Sort { key, direction } => {
                let current = self.roster.sort();
                let direction = direction.unwrap_or(if key == current.key {
                    current.direction.flipped()
                } else {
                    Direction::Asc
                });
                self.roster.set_sort(SortSpec::new(key, direction));
                Reply::Text(self.current_listing())
            }
            Command::Search(term) => self.search(&term),
            Command::Show(row) => match self.student_at(row) {
                Ok(id) => match self.roster.get(id) {
                    Some(student) => {
                        Reply::Text(ui::render_detail(student, &self.images, &self.placeholder))
                    }
                    None => Reply::Problem(Rejection::UnknownStudent(id).to_string()),
                },
                Err(e) => Reply::Problem(e.to_string()),
            },
            Command::Prefect(row) => self.mutate(row, Roster::toggle_prefect),
            Command::Squad(row) => self.mutate(row, Roster::toggle_squad),
            Command::Expel(row) => self.mutate(row, Roster::expel),
            Command::Counts => Reply::Text(ui::render_counts(&self.roster.counts())),
            Command::Help => Reply::Text(HELP.to_string()),
            Command::Quit => Reply::Quit,
        }
    }

    fn student_at(&self, row: usize) -> Result<StudentId> {
        if self.listing.is_empty() {
            return Err(Error::invalid_argument(
                "row",
                row.to_string(),
                "nothing is listed, run 'list' first",
            ));
        }
        row.checked_sub(1)
            .and_then(|idx| self.listing.get(idx).copied())
            .ok_or_else(|| {
                Error::invalid_argument(
                    "row",
                    row.to_string(),
                    format!("choose a row between 1 and {}", self.listing.len()),
                )
            })
    }

    fn mutate(
        &mut self,
        row: usize,
        change: fn(&mut Roster, StudentId) -> std::result::Result<Outcome, Rejection>,
    ) -> Reply {
        let id = match self.student_at(row) {
            Ok(id) => id,
            Err(e) => return Reply::Problem(e.to_string()),
        };
        let name = self
            .roster
            .get(id)
            .map(|s| s.display_name())
            .unwrap_or_default();

        match change(&mut self.roster, id) {
            Ok(outcome) => {
                info!(student = %name, ?outcome, "Roster changed");
                self.roster.refresh();
                Reply::Text(format!(
                    "{}\n\n{}",
                    outcome.describe(&name),
                    self.current_listing()
                ))
            }
            Err(rejection) => Reply::Problem(rejection.to_string()),
        }
    }

    fn search(&mut self, term: &str) -> Reply {
        if term.trim().is_empty() {
            return Reply::Text(self.current_listing());
        }
        let ids: Vec<StudentId> = match self.roster.search(term, self.max_search_len) {
            Ok(found) => found.iter().map(|s| s.id).collect(),
            Err(e) => return Reply::Problem(e.to_string()),
        };
        let title = format!("SEARCH \"{}\"", term.trim());
        Reply::Text(self.listing_text(&title, ids))
    }

    fn current_listing(&mut self) -> String {
        let title = self.roster.filter().title();
        let ids = self.roster.view().iter().map(|s| s.id).collect();
        self.listing_text(&title, ids)
    }

    /// Render `ids` as the new listing that rows refer to
    fn listing_text(&mut self, title: &str, ids: Vec<StudentId>) -> String {
        self.listing = ids;
        let rows: Vec<_> = self
            .listing
            .iter()
            .filter_map(|id| self.roster.get(*id))
            .collect();
        ui::render_listing(title, &self.roster.sort(), &rows, self.roster.len())
    }
}

/// Print a reply. Returns `false` once the session should end.
fn emit<W: Write>(out: &mut W, reply: Reply) -> Result<bool> {
    match reply {
        Reply::Text(text) => {
            write!(out, "{}", text)?;
            out.flush()?;
            Ok(true)
        }
        Reply::Problem(message) => {
            ui::show_error(&message);
            Ok(true)
        }
        Reply::Quit => Ok(false),
    }
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

/// Drive a session from `input` until `quit`, end of input or Ctrl-C.
pub async fn run<R, W>(mut session: Session, input: R, out: &mut W, debounce: Duration) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut pending: Option<String> = None;

    let quiet_period = tokio::time::sleep(debounce);
    tokio::pin!(quiet_period);

    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    writeln!(
        out,
        "Hogwarts roster {}: {} students loaded. Type 'help' for commands.\n",
        crate::version::build_info().short_version(),
        session.roster().len()
    )?;
    emit(out, session.execute(Command::List))?;
    prompt(out)?;

    loop {
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Interrupted, leaving shell");
                writeln!(out)?;
                break;
            }

            () = &mut quiet_period, if pending.is_some() => {
                if let Some(term) = pending.take() {
                    writeln!(out)?;
                    emit(out, session.execute(Command::Search(term)))?;
                    prompt(out)?;
                }
            }

            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => {
                        if let Some(term) = pending.take() {
                            emit(out, session.execute(Command::Search(term)))?;
                        }
                        debug!("End of input, leaving shell");
                        break;
                    }
                };

                match Command::parse(&line) {
                    Ok(Some(Command::Search(term))) => {
                        pending = Some(term);
                        quiet_period
                            .as_mut()
                            .reset(tokio::time::Instant::now() + debounce);
                        continue;
                    }
                    Ok(Some(command)) => {
                        if let Some(term) = pending.take() {
                            emit(out, session.execute(Command::Search(term)))?;
                        }
                        if !emit(out, session.execute(command))? {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => ui::show_error(&e.to_string()),
                }
                prompt(out)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{FamilyLists, RawStudent, Student};
    use tokio::io::BufReader;

    fn roster() -> Roster {
        let families = FamilyLists {
            half: vec!["Potter".into()],
            pure: vec!["Malfoy".into(), "Weasley".into()],
        };
        let students = [
            ("Harry James Potter", "Gryffindor"),
            ("Ron Weasley", "Gryffindor"),
            ("Hermione Granger", "Gryffindor"),
            ("Draco Malfoy", "Slytherin"),
            ("Luna Lovegood", "Ravenclaw"),
        ]
        .iter()
        .map(|(name, house)| {
            Student::build(
                &RawStudent {
                    fullname: name.to_string(),
                    house: house.to_string(),
                    gender: "boy".to_string(),
                },
                &families,
                &ImageLayout::default(),
            )
        })
        .collect();

        let mut roster = Roster::default();
        roster.set_students(students);
        roster
    }

    fn session() -> Session {
        Session::new(roster(), 50, ImageLayout::default(), "images/default_placeholder.png")
    }

    fn text(reply: Reply) -> String {
        match reply {
            Reply::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("LIST").unwrap(), Some(Command::List));
        assert_eq!(
            Command::parse("filter  Slytherin ").unwrap(),
            Some(Command::Filter("Slytherin".into()))
        );
        assert_eq!(
            Command::parse("sort firstName desc").unwrap(),
            Some(Command::Sort {
                key: SortKey::FirstName,
                direction: Some(Direction::Desc)
            })
        );
        assert_eq!(
            Command::parse("sort house").unwrap(),
            Some(Command::Sort {
                key: SortKey::House,
                direction: None
            })
        );
        assert_eq!(Command::parse("search").unwrap(), Some(Command::Search(String::new())));
        assert_eq!(Command::parse("expel 3").unwrap(), Some(Command::Expel(3)));
        assert_eq!(Command::parse("q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("sort").is_err());
        assert!(Command::parse("sort age").is_err());
        assert!(Command::parse("sort house sideways").is_err());
        assert!(Command::parse("show zero").is_err());
        assert!(Command::parse("prefect 0").is_err());
        assert!(Command::parse("dance").is_err());
    }

    #[test]
    fn test_list_is_sorted_by_last_name() {
        let mut session = session();
        let listing = text(session.execute(Command::List));
        assert!(listing.starts_with("ALL STUDENTS (sorted by last-name asc)"));
        assert!(listing.contains("Showing 5 of 5 students"));

        // Granger, Lovegood, Malfoy, Potter, Weasley
        let card = text(session.execute(Command::Show(1)));
        assert!(card.starts_with("Hermione Granger"));
    }

    #[test]
    fn test_rows_follow_last_listing() {
        let mut session = session();
        text(session.execute(Command::Filter("slytherin".into())));
        let card = text(session.execute(Command::Show(1)));
        assert!(card.starts_with("Draco Malfoy"));
        assert!(card.contains("Pure-Blood"));

        assert!(matches!(session.execute(Command::Show(2)), Reply::Problem(_)));
    }

    #[test]
    fn test_rows_need_a_listing() {
        let mut session = session();
        match session.execute(Command::Show(1)) {
            Reply::Problem(message) => assert!(message.contains("run 'list' first")),
            other => panic!("expected a problem, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_repeat_flips_direction() {
        let mut session = session();
        text(session.execute(Command::Sort {
            key: SortKey::FirstName,
            direction: None,
        }));
        assert_eq!(
            session.roster().sort(),
            SortSpec::new(SortKey::FirstName, Direction::Asc)
        );
        text(session.execute(Command::Sort {
            key: SortKey::FirstName,
            direction: None,
        }));
        assert_eq!(
            session.roster().sort(),
            SortSpec::new(SortKey::FirstName, Direction::Desc)
        );
    }

    #[test]
    fn test_prefect_rejection_reaches_error_path() {
        let mut session = session();
        text(session.execute(Command::Filter("gryffindor".into())));
        // Granger, Potter, Weasley
        text(session.execute(Command::Prefect(1)));
        text(session.execute(Command::Prefect(2)));
        assert_eq!(
            session.execute(Command::Prefect(3)),
            Reply::Problem("There are already two prefects in Gryffindor.".into())
        );
        assert_eq!(session.roster().counts().prefects, 2);
    }

    #[test]
    fn test_squad_and_expel() {
        let mut session = session();
        text(session.execute(Command::List));
        // Row 4 is Potter: half-blood Gryffindor
        assert_eq!(
            session.execute(Command::Squad(4)),
            Reply::Problem("Only people of pure blood or in Slytherin can be members".into())
        );

        let reply = text(session.execute(Command::Expel(4)));
        assert!(reply.starts_with("Harry Potter has been expelled"));
        assert!(reply.contains("Showing 4 of 5 students"));

        text(session.execute(Command::Filter("expelled".into())));
        let card = text(session.execute(Command::Show(1)));
        assert!(card.starts_with("Harry James Potter"));
    }

    #[test]
    fn test_search() {
        let mut session = session();
        let found = text(session.execute(Command::Search("LU".into())));
        assert!(found.starts_with("SEARCH \"LU\""));
        assert!(found.contains("Showing 1 of 5 students"));
        assert!(text(session.execute(Command::Show(1))).starts_with("Luna Lovegood"));

        let long = "x".repeat(51);
        assert_eq!(
            session.execute(Command::Search(long)),
            Reply::Problem("Search term too long. Please use fewer characters.".into())
        );
    }

    #[test]
    fn test_counts_and_help() {
        let mut session = session();
        assert!(text(session.execute(Command::Counts)).contains("pure-blood"));
        assert!(text(session.execute(Command::Help)).contains("expel <row>"));
        assert_eq!(session.execute(Command::Quit), Reply::Quit);
    }

    #[tokio::test]
    async fn test_run_newer_search_replaces_pending_one() {
        let input = BufReader::new(&b"search harry\nsearch luna\ncounts\nquit\n"[..]);
        let mut out = Vec::new();
        run(session(), input, &mut out, Duration::from_secs(5))
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("SEARCH \"harry\""));
        let search = out.find("SEARCH \"luna\"").unwrap();
        let counts = out.find("Students per filter").unwrap();
        assert!(search < counts);
    }

    #[tokio::test]
    async fn test_run_flushes_search_at_end_of_input() {
        let input = BufReader::new(&b"search draco"[..]);
        let mut out = Vec::new();
        run(session(), input, &mut out, Duration::from_secs(5))
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("SEARCH \"draco\""));
        assert!(out.contains("Malfoy"));
    }

    #[tokio::test]
    async fn test_run_search_fires_after_quiet_period() {
        let input = tokio_test::io::Builder::new()
            .read(b"search luna\n")
            .wait(Duration::from_millis(300))
            .read(b"quit\n")
            .build();
        let mut out = Vec::new();
        run(session(), BufReader::new(input), &mut out, Duration::from_millis(20))
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("SEARCH \"luna\""));
    }
}
