//! Checklist scanning for task rollover.
//!
//! # Responsibility
//! - Extract unfinished checklist items, with their child bullets, from a note.
//! - Prune empty checkbox placeholders from a note before tasks land in it.
//!
//! # Invariants
//! - Extraction order equals document order.
//! - Checked items and checkboxes without text are never extracted.
//! - A child bullet belongs only to the nearest preceding top-level task and
//!   only when it is indented deeper (by tabs) than that task.

use once_cell::sync::Lazy;
use regex::Regex;

static UNCHECKED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\t*)- \[ \](.*)$").expect("valid unchecked task regex"));
static CHECKED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\t*)- \[[xX]\]").expect("valid checked task regex"));
static CHILD_BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\t+)- ").expect("valid child bullet regex"));

fn is_blank(value: &str) -> bool {
    value.chars().all(|c| c == ' ' || c == '\t')
}

/// Returns the tab depth of an unchecked task line that carries text.
fn unchecked_task_depth(line: &str) -> Option<usize> {
    let caps = UNCHECKED_RE.captures(line)?;
    if is_blank(&caps[2]) {
        return None;
    }
    Some(caps[1].len())
}

fn checked_task_depth(line: &str) -> Option<usize> {
    CHECKED_RE.captures(line).map(|caps| caps[1].len())
}

fn child_bullet_depth(line: &str) -> Option<usize> {
    CHILD_BULLET_RE.captures(line).map(|caps| caps[1].len())
}

/// Returns whether `line` is an unchecked checkbox followed only by blanks.
pub fn is_empty_task_line(line: &str) -> bool {
    UNCHECKED_RE
        .captures(line.trim_end_matches(['\n', '\r']))
        .is_some_and(|caps| is_blank(&caps[2]))
}

/// Drops empty checkboxes and checked items (with the plain bullets they own)
/// so neither can leak into a later task's child capture.
fn rollover_candidate_lines(document: &str) -> Vec<&str> {
    let mut kept = Vec::new();
    let mut checked_depth: Option<usize> = None;

    for line in document.lines() {
        if let Some(limit) = checked_depth {
            let owned_by_checked = child_bullet_depth(line).is_some_and(|depth| depth > limit)
                && !UNCHECKED_RE.is_match(line);
            if owned_by_checked {
                continue;
            }
            checked_depth = None;
        }

        if is_empty_task_line(line) {
            continue;
        }
        if let Some(depth) = checked_task_depth(line) {
            checked_depth = Some(depth);
            continue;
        }
        kept.push(line);
    }

    kept
}

/// Extracts unfinished tasks as multi-line blocks in source order.
///
/// Each block is one unchecked task line with text plus the immediately
/// following bullet lines indented deeper than it. An empty result means
/// there is nothing to roll over.
pub fn extract_incomplete_tasks(document: &str) -> Vec<String> {
    let lines = rollover_candidate_lines(document);
    let mut tasks = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some(depth) = unchecked_task_depth(lines[index]) else {
            index += 1;
            continue;
        };

        let mut block = vec![lines[index]];
        index += 1;
        while let Some(line) = lines.get(index) {
            match child_bullet_depth(line) {
                Some(child_depth) if child_depth > depth => {
                    block.push(line);
                    index += 1;
                }
                _ => break,
            }
        }
        tasks.push(block.join("\n"));
    }

    tasks
}

/// Removes every empty unchecked checkbox line, terminator included, leaving
/// no blank line behind. Checked and non-empty items are untouched.
pub fn prune_empty_task_lines(document: &str) -> String {
    document
        .split_inclusive('\n')
        .filter(|line| !is_empty_task_line(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_task_with_child_and_drops_checked_and_empty() {
        let doc = "- [ ] buy milk\n\t- [ ] 2%\n- [x] done\n- [ ]   \n";
        assert_eq!(extract_incomplete_tasks(doc), vec!["- [ ] buy milk\n\t- [ ] 2%"]);
    }

    #[test]
    fn preserves_source_order() {
        let doc = "## Tasks\n- [ ] first\nprose\n- [ ] second\n- [X] gone\n- [ ] third";
        assert_eq!(
            extract_incomplete_tasks(doc),
            vec!["- [ ] first", "- [ ] second", "- [ ] third"]
        );
    }

    #[test]
    fn checked_item_bullets_do_not_attach_to_previous_task() {
        let doc = "- [ ] open\n- [x] closed\n\t- closed detail\n\t- more detail\n- [ ] next\n";
        assert_eq!(
            extract_incomplete_tasks(doc),
            vec!["- [ ] open", "- [ ] next"]
        );
    }

    #[test]
    fn unfinished_subtask_of_checked_parent_is_kept() {
        let doc = "- [x] parent\n\t- [ ] leftover\n\t\t- note\n";
        assert_eq!(
            extract_incomplete_tasks(doc),
            vec!["\t- [ ] leftover\n\t\t- note"]
        );
    }

    #[test]
    fn checked_child_is_dropped_from_block() {
        let doc = "- [ ] parent\n\t- [x] done child\n\t- [ ] open child\n";
        assert_eq!(
            extract_incomplete_tasks(doc),
            vec!["- [ ] parent\n\t- [ ] open child"]
        );
    }

    #[test]
    fn blank_line_ends_child_capture() {
        let doc = "- [ ] a\n\n\t- stray\n";
        assert_eq!(extract_incomplete_tasks(doc), vec!["- [ ] a"]);
    }

    #[test]
    fn empty_checkbox_at_end_without_newline_is_ignored() {
        assert!(extract_incomplete_tasks("- [x] done\n- [ ] ").is_empty());
    }

    #[test]
    fn never_extracts_checked_or_blank_lines() {
        let doc = "- [ ] a\n\t- [x] b\n\t- [ ] \t\n- [x] c\n\t- [ ] d\n";
        for block in extract_incomplete_tasks(doc) {
            for line in block.lines() {
                assert!(!CHECKED_RE.is_match(line), "checked line leaked: {line}");
                assert!(!is_empty_task_line(line), "empty checkbox leaked: {line}");
            }
        }
    }

    #[test]
    fn prune_removes_only_empty_unchecked_lines() {
        let doc = "## Tasks\n- [ ] \n- [x] done\n\t- [ ]\n- [ ] real\n";
        assert_eq!(
            prune_empty_task_lines(doc),
            "## Tasks\n- [x] done\n- [ ] real\n"
        );
    }

    #[test]
    fn prune_handles_last_line_without_terminator() {
        assert_eq!(prune_empty_task_lines("## Tasks\n- [ ]  "), "## Tasks\n");
    }

    #[test]
    fn prune_is_a_fixed_point() {
        let doc = "- [ ] \n- [ ] \n\n- [ ] keep\n- [ ]\n";
        let once = prune_empty_task_lines(doc);
        assert_eq!(prune_empty_task_lines(&once), once);
    }
}
