//! Day-of-week titling.

use chrono::Datelike;
use crate::text::embed::{expand_for, ReferenceDate};

/// Placeholder consumed by the title step only.
pub const CUSTOM_DOTW_TOKEN: &str = "<#dnm>custom-dotw</#dnm>";

/// Computes the title for `reference_date` from Sunday-first `titles`.
///
/// The configured text may itself contain embeddables, expanded against the
/// same date. Returns `None` for an unparseable date or a blank entry.
pub fn day_title(titles: &[String; 7], reference_date: &str) -> Option<String> {
    day_title_for(titles, ReferenceDate::parse(reference_date))
}

/// [`day_title`] against an already resolved reference date.
pub fn day_title_for(titles: &[String; 7], reference: ReferenceDate<'_>) -> Option<String> {
    let day = reference.date?.weekday();
    let raw = titles[day.num_days_from_sunday() as usize].trim();
    if raw.is_empty() {
        return None;
    }
    Some(expand_for(raw, reference))
}

/// Byte offset just past a leading YAML front matter block, if any.
///
/// The closing `---` line may end the document, and either line ending is
/// accepted.
fn front_matter_end(document: &str) -> usize {
    let is_fence = |line: &str| line.trim_end_matches(['\r', '\n']) == "---";
    let mut lines = document.split_inclusive('\n');
    let mut offset = match lines.next() {
        Some(open) if is_fence(open) => open.len(),
        _ => return 0,
    };
    for line in lines {
        offset += line.len();
        if is_fence(line) {
            return offset;
        }
    }
    0
}

/// Places `title` into `document`.
///
/// Every custom-dotw placeholder is replaced when one is present. Otherwise a
/// top-level heading is inserted at the top of the body (after front matter),
/// unless the body already starts with that exact heading.
pub fn apply_day_title(document: &str, title: &str) -> String {
    if document.contains(CUSTOM_DOTW_TOKEN) {
        return document.replace(CUSTOM_DOTW_TOKEN, title);
    }

    let heading = format!("# {title}");
    let split = front_matter_end(document);
    let (front, body) = document.split_at(split);
    if body.lines().next() == Some(heading.as_str()) {
        return document.to_string();
    }

    let separator = if front.is_empty() || front.ends_with('\n') {
        ""
    } else {
        "\n"
    };
    format!("{front}{separator}{heading}\n{body}")
}
