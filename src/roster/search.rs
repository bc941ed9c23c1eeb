//! Free-text name search.

use thiserror::Error;

/// Longest accepted search term, in characters
pub const DEFAULT_MAX_SEARCH_LEN: usize = 50;

/// Why a search term was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Search term too long. Please use fewer characters.")]
    TooLong { len: usize, max: usize },
}

/// Lowercase, trim and sanitize a raw search term.
///
/// The length limit applies to the lowercased, trimmed input before the
/// markup characters `< > " ' &` are stripped.
pub fn normalize_term(raw: &str, max_len: usize) -> Result<String, SearchError> {
    let term = raw.to_lowercase();
    let term = term.trim();
    let len = term.chars().count();
    if len > max_len {
        return Err(SearchError::TooLong { len, max: max_len });
    }
    Ok(sanitize(term))
}

/// Strip markup characters and surrounding whitespace
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '&'))
        .collect::<String>()
        .trim()
        .to_string()
}
