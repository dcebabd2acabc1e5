//! Content insertion below a destination heading.
//!
//! # Responsibility
//! - Insert content directly under the first occurrence of a heading literal.
//! - Normalize the blank-line run after the inserted content.
//!
//! # Invariants
//! - A missing heading yields `MergeOutcome::HeadingMissing`, never an edited
//!   document, so callers can tell a no-op apart from a rewrite whose content
//!   happened to be empty.
//! - Merging appends: re-running with different content inserts again rather
//!   than replacing what an earlier run inserted.

use std::iter;

/// Blank-line run written after merged content when the template had a
/// sparse (or no) run of its own.
const DEFAULT_TRAILING_NEWLINES: usize = 2;

/// Result of [`merge_at_heading`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Heading found; holds the rewritten document.
    Merged(String),
    /// Heading literal does not occur in the document.
    HeadingMissing,
}

impl MergeOutcome {
    /// Returns the rewritten document, or `None` when the heading was missing.
    pub fn into_merged(self) -> Option<String> {
        match self {
            Self::Merged(document) => Some(document),
            Self::HeadingMissing => None,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged(_))
    }
}

/// Inserts `content` on the line after the first verbatim occurrence of
/// `marker`.
///
/// Let `n` be the number of line breaks right after the marker, not counting
/// the marker's own terminator. The marker and that whole run are replaced by
/// `marker + "\n" + content` followed by two line breaks when `n <= 2`, or by
/// `n` line breaks otherwise, which preserves wider template spacing.
///
/// An empty `marker` is treated as missing.
pub fn merge_at_heading(document: &str, marker: &str, content: &str) -> MergeOutcome {
    if marker.is_empty() {
        return MergeOutcome::HeadingMissing;
    }
    let Some(start) = document.find(marker) else {
        return MergeOutcome::HeadingMissing;
    };

    let after_marker = start + marker.len();
    let run = document[after_marker..]
        .bytes()
        .take_while(|byte| *byte == b'\n')
        .count();
    let existing_blank_lines = run.saturating_sub(1);
    let trailing = if existing_blank_lines <= DEFAULT_TRAILING_NEWLINES {
        DEFAULT_TRAILING_NEWLINES
    } else {
        existing_blank_lines
    };

    let rest = &document[after_marker + run..];
    let mut merged =
        String::with_capacity(document.len() + content.len() + trailing + 1);
    merged.push_str(&document[..start]);
    merged.push_str(marker);
    merged.push('\n');
    merged.push_str(content);
    merged.extend(iter::repeat('\n').take(trailing));
    merged.push_str(rest);

    MergeOutcome::Merged(merged)
}
