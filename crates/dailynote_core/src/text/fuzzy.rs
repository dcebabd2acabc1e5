//! Subsequence matching used by heading and folder pickers.

/// Returns whether every character of `input` appears in `name` in order,
/// ignoring case. An empty `input` matches everything.
pub fn fuzzy_match(name: &str, input: &str) -> bool {
    let name = name.to_lowercase();
    let mut remaining = name.chars();
    input
        .to_lowercase()
        .chars()
        .all(|wanted| remaining.any(|candidate| candidate == wanted))
}

#[cfg(test)]
mod tests {
    use super::fuzzy_match;

    #[test]
    fn matches_in_order_subsequence_case_insensitively() {
        assert!(fuzzy_match("## Daily Tasks", "dtsk"));
        assert!(fuzzy_match("Archive/2024", "ARC24"));
        assert!(fuzzy_match("anything", ""));
    }

    #[test]
    fn rejects_out_of_order_or_missing_characters() {
        assert!(!fuzzy_match("## Tasks", "skt"));
        assert!(!fuzzy_match("## Tasks", "tasksx"));
    }
}
