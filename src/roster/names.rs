//! Name capitalization.

/// Capitalize a single name token.
///
/// The first letter is upper-cased and everything else lower-cased. For
/// compound names the letter right after the first hyphen is upper-cased
/// too, so `finch-fletchley` becomes `Finch-Fletchley`. Empty or absent
/// input yields `None`.
pub fn capitalize(token: Option<&str>) -> Option<String> {
    let token = token?;
    if token.is_empty() {
        return None;
    }

    let hyphen = token.find('-');
    let mut out = String::with_capacity(token.len());
    let mut after_hyphen = false;

    for (idx, ch) in token.char_indices() {
        if idx == 0 || after_hyphen {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        after_hyphen = hyphen == Some(idx);
    }

    Some(out)
}

/// Capitalize a required field, falling back to an empty string.
pub fn capitalize_field(value: &str) -> String {
    capitalize(Some(value.trim())).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_names() {
        assert_eq!(capitalize(Some("mcgonagall")).as_deref(), Some("Mcgonagall"));
        assert_eq!(capitalize(Some("HARRY")).as_deref(), Some("Harry"));
        assert_eq!(capitalize(Some("h")).as_deref(), Some("H"));
    }

    #[test]
    fn test_hyphenated_names() {
        assert_eq!(
            capitalize(Some("finch-fletchley")).as_deref(),
            Some("Finch-Fletchley")
        );
        assert_eq!(
            capitalize(Some("FINCH-FLETCHLEY")).as_deref(),
            Some("Finch-Fletchley")
        );
        // Only the first hyphen starts a new capital
        assert_eq!(capitalize(Some("a-b-c")).as_deref(), Some("A-B-c"));
        // Trailing hyphen has nothing to capitalize
        assert_eq!(capitalize(Some("ab-")).as_deref(), Some("Ab-"));
    }

    #[test]
    fn test_empty_and_absent() {
        assert_eq!(capitalize(None), None);
        assert_eq!(capitalize(Some("")), None);
    }

    #[test]
    fn test_non_ascii() {
        assert_eq!(capitalize(Some("émile")).as_deref(), Some("Émile"));
    }

    #[test]
    fn test_capitalize_field_trims() {
        assert_eq!(capitalize_field("  gryffindor "), "Gryffindor");
        assert_eq!(capitalize_field("   "), "");
    }
}
