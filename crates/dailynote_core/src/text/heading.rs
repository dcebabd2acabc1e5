//! Heading lookup over free-form markdown.
//!
//! # Responsibility
//! - Measure the depth of a configured heading literal.
//! - Extract the section owned by a heading (up to the next heading of equal
//!   or shallower depth).
//! - List heading lines of a template for picker suggestions.
//!
//! # Invariants
//! - Heading literals are matched verbatim; they are never compiled into a
//!   pattern, so regex metacharacters in user headings are inert.
//! - An extracted section never contains a heading line whose depth is less
//!   than or equal to the owning heading's depth.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#+ [^\r\n]*").expect("valid heading line regex"));

/// Counts the leading `#` characters of a heading literal.
///
/// Returns `0` when the literal has none, which callers treat as "unbounded":
/// a section owned by such a marker runs to the end of the document.
pub fn depth_of(marker: &str) -> usize {
    marker.bytes().take_while(|byte| *byte == b'#').count()
}

/// Returns the depth of `line` when it is a heading line (`#`s then a space).
pub fn heading_line_depth(line: &str) -> Option<usize> {
    let depth = depth_of(line);
    if depth > 0 && line[depth..].starts_with(' ') {
        Some(depth)
    } else {
        None
    }
}

/// Returns the byte offset just past the line break that follows the first
/// verbatim occurrence of `marker` that is followed by a line break.
fn section_start(document: &str, marker: &str) -> Option<usize> {
    if marker.is_empty() {
        return None;
    }

    document.match_indices(marker).find_map(|(index, _)| {
        let after = index + marker.len();
        let rest = &document[after..];
        if rest.starts_with('\n') {
            Some(after + 1)
        } else if rest.starts_with("\r\n") {
            Some(after + 2)
        } else {
            None
        }
    })
}

/// Extracts the body owned by `marker` in `document`.
///
/// The body starts after the heading's own line break and stops before the
/// line break preceding the next heading line of depth `<= depth_of(marker)`,
/// or at the end of the document. Blank lines inside the section are kept
/// verbatim.
///
/// Returns `None` when `marker` never occurs followed by a line break.
pub fn extract_section<'a>(document: &'a str, marker: &str) -> Option<&'a str> {
    let start = section_start(document, marker)?;
    let body = &document[start..];
    let depth = depth_of(marker);
    if depth == 0 {
        return Some(body);
    }

    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if heading_line_depth(bare).is_some_and(|found| found <= depth) {
            let section = &body[..offset];
            let section = section.strip_suffix('\n').unwrap_or(section);
            return Some(section.strip_suffix('\r').unwrap_or(section));
        }
        offset += line.len();
    }

    Some(body)
}

/// Trims leading and trailing line breaks so merged content carries no
/// spacing of its own; indentation on the first and last lines is kept.
pub fn trim_blank_lines(section: &str) -> &str {
    section.trim_matches(['\n', '\r'])
}

/// Lists every heading line (`#`s followed by a space) in document order.
pub fn list_headings(document: &str) -> Vec<String> {
    HEADING_LINE_RE
        .find_iter(document)
        .map(|found| found.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_counts_leading_hashes_only() {
        assert_eq!(depth_of("### Notes"), 3);
        assert_eq!(depth_of("Notes #1"), 0);
        assert_eq!(depth_of(""), 0);
    }

    #[test]
    fn heading_line_requires_space_after_hashes() {
        assert_eq!(heading_line_depth("## Tasks"), Some(2));
        assert_eq!(heading_line_depth("##Tasks"), None);
        assert_eq!(heading_line_depth("#tag in text"), None);
    }

    #[test]
    fn section_stops_at_sibling_heading() {
        let doc = "# Day\n## Notes\nline one\n\nline two\n## Tasks\n- [ ] a\n";
        assert_eq!(extract_section(doc, "## Notes"), Some("line one\n\nline two"));
    }

    #[test]
    fn section_keeps_deeper_subheadings() {
        let doc = "## Log\nintro\n### Morning\ncoffee\n## Next\nrest";
        assert_eq!(
            extract_section(doc, "## Log"),
            Some("intro\n### Morning\ncoffee")
        );
    }

    #[test]
    fn section_stops_at_shallower_heading() {
        let doc = "### Deep\nbody\n# Top\nmore";
        assert_eq!(extract_section(doc, "### Deep"), Some("body"));
    }

    #[test]
    fn section_runs_to_end_without_following_heading() {
        let doc = "## Notes\nfirst\nsecond";
        assert_eq!(extract_section(doc, "## Notes"), Some("first\nsecond"));
    }

    #[test]
    fn section_requires_line_break_after_marker() {
        assert_eq!(extract_section("intro\n## Notes", "## Notes"), None);
        assert_eq!(extract_section("## Other\ntext\n", "## Notes"), None);
    }

    #[test]
    fn section_skips_occurrences_not_followed_by_line_break() {
        let doc = "see ## Notes below\n## Notes\nreal body\n## End\n";
        assert_eq!(extract_section(doc, "## Notes"), Some("real body"));
    }

    #[test]
    fn marker_with_regex_metacharacters_matches_verbatim() {
        let doc = "## Tasks (today)?\n- [ ] call\n## Done\n";
        assert_eq!(extract_section(doc, "## Tasks (today)?"), Some("- [ ] call"));
    }

    #[test]
    fn unbounded_marker_runs_to_document_end() {
        let doc = "Carry:\nkeep\n## Heading\nalso kept";
        assert_eq!(
            extract_section(doc, "Carry:"),
            Some("keep\n## Heading\nalso kept")
        );
    }

    #[test]
    fn extracted_section_never_contains_same_or_shallower_heading() {
        let doc = "# A\n## B\nx\n### C\ny\n## D\nz\n# E\n";
        for marker in ["# A", "## B", "### C", "## D"] {
            let section = extract_section(doc, marker).expect("marker present");
            let depth = depth_of(marker);
            for line in section.lines() {
                if let Some(found) = heading_line_depth(line) {
                    assert!(found > depth, "{marker} section leaked `{line}`");
                }
            }
        }
    }

    #[test]
    fn crlf_documents_are_bounded_cleanly() {
        let doc = "## Notes\r\nbody\r\n## Next\r\n";
        assert_eq!(extract_section(doc, "## Notes"), Some("body"));
    }

    #[test]
    fn trim_blank_lines_keeps_indentation() {
        assert_eq!(trim_blank_lines("\n\n\t- item\n\n"), "\t- item");
    }

    #[test]
    fn list_headings_returns_heading_lines_in_order() {
        let template = "# <#dnm>dotw</#dnm>\ntext #tag\n## Tasks\n- [ ] \n### Sub\n";
        assert_eq!(
            list_headings(template),
            vec!["# <#dnm>dotw</#dnm>", "## Tasks", "### Sub"]
        );
    }
}
