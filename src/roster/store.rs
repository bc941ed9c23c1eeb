//! The roster: full student set, active filter and sort, derived view.

use std::collections::BTreeMap;

use tracing::debug;

use super::filter::{filter, Filter};
use super::mutation::{self, Outcome, Rejection};
use super::search::{normalize_term, SearchError};
use super::sort::{sort, SortSpec};
use super::student::{BloodStatus, Student, StudentId};

/// Owns every student plus the listing configuration.
///
/// Configuration changes recompute the cached view before returning.
/// Mutations do not; call [`Roster::refresh`] after them.
#[derive(Debug, Default)]
pub struct Roster {
    students: Vec<Student>,
    filter: Filter,
    active: Filter,
    sort: SortSpec,
    view: Vec<StudentId>,
}

impl Roster {
    /// Create an empty roster with the given listing configuration
    pub fn new(filter: Filter, sort: SortSpec) -> Self {
        Self {
            students: Vec::new(),
            active: filter.clone(),
            filter,
            sort,
            view: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Collection state
    // ─────────────────────────────────────────────────────────────

    /// Replace the full student set. Ids are reassigned in input order.
    pub fn set_students(&mut self, students: Vec<Student>) {
        self.students = students;
        for (idx, student) in self.students.iter_mut().enumerate() {
            student.id = StudentId(idx);
        }
        self.active = self.filter.resolve(&self.students);
        self.refresh();
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.active = filter.resolve(&self.students);
        self.filter = filter;
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.refresh();
    }

    /// Criterion in effect. Names nobody matches resolve to [`Filter::All`]
    /// when the filter or the student set is replaced.
    pub fn filter(&self) -> &Filter {
        &self.active
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.students.get(id.0)
    }

    // ─────────────────────────────────────────────────────────────
    // Derived view
    // ─────────────────────────────────────────────────────────────

    /// Filter then sort the full set with the current configuration.
    pub fn derive_view(&self) -> Vec<&Student> {
        let filtered = filter(&self.students, &self.active);
        sort(&filtered, self.sort)
    }

    /// Recompute the cached view.
    pub fn refresh(&mut self) {
        let view: Vec<StudentId> = self.derive_view().iter().map(|s| s.id).collect();
        self.view = view;
        debug!(
            filter = %self.active,
            sort = %self.sort,
            shown = self.view.len(),
            total = self.students.len(),
            "Roster view refreshed"
        );
    }

    /// Snapshot from the last recompute
    pub fn view(&self) -> Vec<&Student> {
        self.view
            .iter()
            .filter_map(|id| self.students.get(id.0))
            .collect()
    }

    /// Students whose first, last or nick name contains `term`, restricted
    /// to the current filter and ordered by the current sort. An empty term
    /// yields the current view.
    pub fn search(&self, term: &str, max_len: usize) -> Result<Vec<&Student>, SearchError> {
        let term = normalize_term(term, max_len)?;
        if term.is_empty() {
            return Ok(self.view());
        }

        let matches: Vec<&Student> = self
            .students
            .iter()
            .filter(|s| s.name_contains(&term) && self.active.matches(s))
            .collect();
        Ok(sort(&matches, self.sort))
    }

    /// Find a student by name, case-insensitively: the full name (quotes
    /// around the nickname optional), first and last name, or first name.
    /// Name matches win over first-name matches.
    pub fn find_by_name(&self, query: &str) -> Option<&Student> {
        let query = lookup_key(query);
        self.students
            .iter()
            .find(|s| {
                lookup_key(&s.full_name()) == query || lookup_key(&s.display_name()) == query
            })
            .or_else(|| {
                self.students
                    .iter()
                    .find(|s| s.first_name.eq_ignore_ascii_case(&query))
            })
    }

    // ─────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────

    pub fn assign_prefect(&mut self, id: StudentId) -> Result<Outcome, Rejection> {
        mutation::assign_prefect(&mut self.students, id)
    }

    pub fn remove_prefect(&mut self, id: StudentId) -> Result<Outcome, Rejection> {
        mutation::remove_prefect(&mut self.students, id)
    }

    pub fn toggle_prefect(&mut self, id: StudentId) -> Result<Outcome, Rejection> {
        mutation::toggle_prefect(&mut self.students, id)
    }

    pub fn toggle_squad(&mut self, id: StudentId) -> Result<Outcome, Rejection> {
        mutation::toggle_squad(&mut self.students, id)
    }

    pub fn expel(&mut self, id: StudentId) -> Result<Outcome, Rejection> {
        mutation::expel(&mut self.students, id)
    }

    // ─────────────────────────────────────────────────────────────
    // Counts
    // ─────────────────────────────────────────────────────────────

    /// Per-criterion counts over the full set
    pub fn counts(&self) -> Counts {
        let active = || self.students.iter().filter(|s| !s.expelled);

        let mut houses = BTreeMap::new();
        for student in self.students.iter().filter(|s| !s.house.is_empty()) {
            let entry = houses.entry(student.house.clone()).or_insert(0);
            if !student.expelled {
                *entry += 1;
            }
        }

        let blood_status = BloodStatus::all()
            .iter()
            .map(|status| (*status, active().filter(|s| s.blood_status == *status).count()))
            .collect();

        Counts {
            all: active().count(),
            houses,
            blood_status,
            prefects: active().filter(|s| s.prefect).count(),
            squad: active().filter(|s| s.squad).count(),
            expelled: self.students.iter().filter(|s| s.expelled).count(),
        }
    }
}

/// Number of students each filter would show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    pub all: usize,
    /// Active students per house; every house seen in the data is listed
    pub houses: BTreeMap<String, usize>,
    pub blood_status: Vec<(BloodStatus, usize)>,
    pub prefects: usize,
    pub squad: usize,
    pub expelled: usize,
}

impl Counts {
    /// (filter criterion, count) pairs in display order
    pub fn entries(&self) -> Vec<(String, usize)> {
        let mut entries = vec![("all".to_string(), self.all)];
        entries.extend(
            self.houses
                .iter()
                .map(|(house, count)| (house.to_lowercase(), *count)),
        );
        entries.extend(
            self.blood_status
                .iter()
                .map(|(status, count)| (status.slug().to_string(), *count)),
        );
        entries.push(("prefects".to_string(), self.prefects));
        entries.push(("inquisitorialsquad".to_string(), self.squad));
        entries.push(("expelled".to_string(), self.expelled));
        entries
    }
}

/// Lowercased words without quotes, single-spaced
fn lookup_key(name: &str) -> String {
    name.replace('"', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::sort::{Direction, SortKey};
    use crate::roster::student::tests::student;

    fn trio() -> Vec<Student> {
        vec![
            student("Harry Potter", "Gryffindor"),
            student("Ron Weasley", "Gryffindor"),
            student("Hermione Granger", "Gryffindor"),
        ]
    }

    fn names(list: &[&Student]) -> Vec<String> {
        list.iter().map(|s| s.first_name.clone()).collect()
    }

    #[test]
    fn test_end_to_end_trio() {
        let mut roster = Roster::default();
        roster.set_students(trio());

        for s in roster.students() {
            assert_eq!(s.blood_status, BloodStatus::Muggle);
        }
        let images: Vec<&str> = roster.students().iter().map(|s| s.image.as_str()).collect();
        assert_eq!(
            images,
            vec!["images/potter_h.png", "images/weasley_r.png", "images/granger_h.png"]
        );

        // Filtering alone keeps insertion order
        let all = filter(roster.students(), &Filter::All);
        assert_eq!(names(&all), vec!["Harry", "Ron", "Hermione"]);

        // The default view is sorted by last name
        assert_eq!(names(&roster.view()), vec!["Hermione", "Harry", "Ron"]);
    }

    #[test]
    fn test_set_students_assigns_ids() {
        let mut roster = Roster::default();
        roster.set_students(trio());
        let ids: Vec<usize> = roster.students().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(roster.get(StudentId(1)).unwrap().first_name, "Ron");
        assert!(roster.get(StudentId(3)).is_none());
    }

    #[test]
    fn test_config_changes_recompute_view() {
        let mut roster = Roster::default();
        roster.set_students(trio());

        roster.set_sort(SortSpec::new(SortKey::FirstName, Direction::Desc));
        assert_eq!(names(&roster.view()), vec!["Ron", "Hermione", "Harry"]);

        roster.set_filter(Filter::Expelled);
        assert!(roster.view().is_empty());
    }

    #[test]
    fn test_mutations_wait_for_refresh() {
        let mut roster = Roster::default();
        roster.set_students(trio());

        roster.expel(StudentId(0)).unwrap();
        // Cached snapshot still shows Harry until refreshed
        assert_eq!(roster.view().len(), 3);
        assert_eq!(roster.derive_view().len(), 2);

        roster.refresh();
        assert_eq!(names(&roster.view()), vec!["Hermione", "Ron"]);
    }

    #[test]
    fn test_search_within_filter() {
        let mut roster = Roster::default();
        let mut students = trio();
        students.push(student("Harold Dingle", "Hufflepuff"));
        roster.set_students(students);

        let found = roster.search("HAR", 50).unwrap();
        assert_eq!(names(&found), vec!["Harold", "Harry"]);

        roster.set_filter(Filter::parse("gryffindor"));
        let found = roster.search("har", 50).unwrap();
        assert_eq!(names(&found), vec!["Harry"]);

        roster.expel(StudentId(0)).unwrap();
        assert!(roster.search("harry", 50).unwrap().is_empty());
    }

    #[test]
    fn test_empty_search_returns_view() {
        let mut roster = Roster::default();
        roster.set_students(trio());
        assert_eq!(names(&roster.search("   ", 50).unwrap()), names(&roster.view()));
    }

    #[test]
    fn test_search_too_long() {
        let mut roster = Roster::default();
        roster.set_students(trio());
        assert!(matches!(
            roster.search(&"x".repeat(60), 50),
            Err(SearchError::TooLong { .. })
        ));
    }

    #[test]
    fn test_find_by_name() {
        let mut roster = Roster::default();
        roster.set_students(trio());
        assert_eq!(roster.find_by_name("ron  weasley").unwrap().first_name, "Ron");
        assert_eq!(roster.find_by_name("HERMIONE").unwrap().first_name, "Hermione");
        assert!(roster.find_by_name("neville").is_none());
    }

    #[test]
    fn test_unknown_filter_resolves_to_all() {
        let mut roster = Roster::new(Filter::parse("gryffindor"), SortSpec::default());
        assert_eq!(roster.filter(), &Filter::parse("gryffindor"));

        roster.set_students(trio());
        assert_eq!(roster.filter(), &Filter::parse("gryffindor"));
        assert_eq!(roster.view().len(), 3);

        roster.set_filter(Filter::parse("durmstrang"));
        assert_eq!(roster.filter(), &Filter::All);
        roster.set_sort(SortSpec::new(SortKey::FirstName, Direction::Desc));
        assert_eq!(roster.filter(), &Filter::All);
        assert_eq!(names(&roster.view()), vec!["Ron", "Hermione", "Harry"]);

        let mut students = trio();
        students.push(student("Viktor Krum", "Durmstrang"));
        roster.set_students(students);
        assert_eq!(roster.filter(), &Filter::parse("durmstrang"));
        assert_eq!(names(&roster.view()), vec!["Viktor"]);
    }

    #[test]
    fn test_find_by_full_name() {
        let mut roster = Roster::default();
        roster.set_students(vec![
            student("  harry James potter ", "gryffindor"),
            student("Ernest \"Ernie\" Macmillan", "Hufflepuff"),
        ]);

        let harry = roster.find_by_name("harry james potter").unwrap();
        assert_eq!(harry.middle_name.as_deref(), Some("James"));
        assert_eq!(roster.find_by_name("Harry Potter").unwrap().id, harry.id);

        let ernie = roster.find_by_name("ernest \"ernie\" macmillan").unwrap();
        assert_eq!(ernie.nick_name.as_deref(), Some("Ernie"));
        assert_eq!(roster.find_by_name("Ernest Ernie Macmillan").unwrap().id, ernie.id);
        assert!(roster.find_by_name("harry ernie potter").is_none());
    }

    #[test]
    fn test_counts() {
        let mut roster = Roster::default();
        let mut students = trio();
        students.push(student("Draco Malfoy", "Slytherin"));
        students[3].blood_status = BloodStatus::PureBlood;
        roster.set_students(students);

        roster.assign_prefect(StudentId(0)).unwrap();
        roster.toggle_squad(StudentId(3)).unwrap();
        roster.expel(StudentId(1)).unwrap();

        let counts = roster.counts();
        assert_eq!(counts.all, 3);
        assert_eq!(counts.houses.get("Gryffindor"), Some(&2));
        assert_eq!(counts.houses.get("Slytherin"), Some(&1));
        assert_eq!(counts.prefects, 1);
        assert_eq!(counts.squad, 1);
        assert_eq!(counts.expelled, 1);
        assert!(counts
            .blood_status
            .contains(&(BloodStatus::PureBlood, 1)));
        assert!(counts.blood_status.contains(&(BloodStatus::Muggle, 2)));

        let entries = counts.entries();
        assert_eq!(entries[0], ("all".to_string(), 3));
        assert_eq!(entries.last(), Some(&("expelled".to_string(), 1)));
        assert!(entries.contains(&("gryffindor".to_string(), 2)));
    }
}
