//! Embeddable token expansion (`<#dnm>kind[:modifier]</#dnm>`).
//!
//! # Responsibility
//! - Expand `dotw` and `date` tokens against a note's date identity, or a
//!   date already resolved from the vault's date format.
//! - Expand the `previous` token into a link to the previous daily note.
//!
//! # Invariants
//! - Each pass only rewrites its own token kind; unknown kinds stay verbatim.
//! - An unparseable reference date leaves date-dependent tokens untouched.
//! - The `dotw` and `date` passes commute.

use crate::text::moment::format_moment;
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub const DOTW_TOKEN: &str = "<#dnm>dotw</#dnm>";
pub const DATE_TOKEN: &str = "<#dnm>date</#dnm>";
pub const PREVIOUS_TOKEN: &str = "<#dnm>previous</#dnm>";

/// Sunday-first weekday names, indexed by `num_days_from_sunday`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

static DATE_FORMAT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<#dnm>date:(.*?)</#dnm>").expect("valid date token regex"));

/// Reference-date layouts accepted for a note's date identity.
const REFERENCE_DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

/// Parses a note's date identity (`2024-03-04` and close variants).
pub fn parse_reference_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    REFERENCE_DATE_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(date, pattern).ok())
}

/// Day-of-week for a date identity, or `None` when it cannot be parsed.
pub fn day_of_week(date: &str) -> Option<Weekday> {
    parse_reference_date(date).map(|parsed| parsed.weekday())
}

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_sunday() as usize]
}

/// A note's identity together with the date it stands for.
///
/// The identity is what bare `date` tokens render; the date drives `dotw` and
/// `date:FORMAT`. Vaults with a custom date format resolve `date` from the
/// note listing rather than from the identity text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate<'a> {
    pub identity: &'a str,
    pub date: Option<NaiveDate>,
}

impl<'a> ReferenceDate<'a> {
    pub fn new(identity: &'a str, date: Option<NaiveDate>) -> Self {
        Self { identity, date }
    }

    /// Reads the date from an ISO-like identity.
    pub fn parse(identity: &'a str) -> Self {
        Self::new(identity, parse_reference_date(identity))
    }
}

/// Runs the generic passes (`dotw`, then `date`) over `text`.
pub fn expand(text: &str, reference_date: &str) -> String {
    expand_for(text, ReferenceDate::parse(reference_date))
}

/// [`expand`] against an already resolved reference date.
pub fn expand_for(text: &str, reference: ReferenceDate<'_>) -> String {
    let text = expand_dotw_for(text, reference.date);
    expand_date_for(&text, reference)
}

/// Replaces every `dotw` token with the weekday name of `reference_date`.
pub fn expand_dotw(text: &str, reference_date: &str) -> String {
    expand_dotw_for(text, parse_reference_date(reference_date))
}

pub fn expand_dotw_for(text: &str, date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => text.replace(DOTW_TOKEN, weekday_name(date.weekday())),
        None => text.to_string(),
    }
}

/// Replaces bare `date` tokens with `reference_date` verbatim, then renders
/// every `date:FORMAT` token with its moment-style format.
///
/// An empty modifier renders like the bare token. Formatted tokens are left
/// as-is when `reference_date` cannot be parsed.
pub fn expand_date(text: &str, reference_date: &str) -> String {
    expand_date_for(text, ReferenceDate::parse(reference_date))
}

pub fn expand_date_for(text: &str, reference: ReferenceDate<'_>) -> String {
    let text = text.replace(DATE_TOKEN, reference.identity);

    DATE_FORMAT_TOKEN_RE
        .replace_all(&text, |caps: &Captures<'_>| {
            let format = &caps[1];
            if format.is_empty() {
                return reference.identity.to_string();
            }
            match reference.date {
                Some(date) => format_moment(date, format),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Markdown link target for a note identity in the same folder.
fn note_link_target(note_id: &str) -> String {
    format!("{}.md", note_id.replace(' ', "%20"))
}

/// Replaces every `previous` token with a link to `previous_id`.
///
/// The display text is `link_text` expanded against the previous note's date,
/// or the previous note's identity when `link_text` is blank.
pub fn expand_previous(text: &str, previous_id: &str, link_text: &str) -> String {
    expand_previous_for(text, ReferenceDate::parse(previous_id), link_text)
}

pub fn expand_previous_for(text: &str, previous: ReferenceDate<'_>, link_text: &str) -> String {
    if !text.contains(PREVIOUS_TOKEN) {
        return text.to_string();
    }

    let display = if link_text.trim().is_empty() {
        previous.identity.to_string()
    } else {
        expand_for(link_text, previous)
    };
    let link = format!("[{display}]({})", note_link_target(previous.identity));
    text.replace(PREVIOUS_TOKEN, &link)
}
