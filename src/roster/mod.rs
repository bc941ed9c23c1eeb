//! Roster core: student records and everything that derives listings
//! from them.
//!
//! - `names`: capitalization of raw name tokens
//! - `student`: the record type and its builder
//! - `filter` / `sort`: the two stages of a listing
//! - `mutation`: validated role and expulsion changes
//! - `search`: search term normalization
//! - `store`: the `Roster` that owns the collection

mod filter;
mod mutation;
mod names;
mod search;
mod sort;
mod store;
mod student;

pub use filter::Filter;
pub use mutation::{Outcome, Rejection};
pub use search::DEFAULT_MAX_SEARCH_LEN;
pub use sort::{Direction, SortKey, SortSpec};
pub use store::{Counts, Roster};
pub use student::{FamilyLists, ImageLayout, RawStudent, Student, StudentId};
