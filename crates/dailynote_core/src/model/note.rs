//! Daily-note identity and listing metadata.
//!
//! # Responsibility
//! - Define the date-derived identity used by the Processing Log and as the
//!   embeddable reference date.
//! - Provide granularity-prefixed listing keys and their date ordering.
//!
//! # Invariants
//! - A `NoteId` is the note's basename and never contains a path separator.
//! - Listing keys are `<granularity>-<ISO date>`; ordering is by parsed date,
//!   newest first, with unparseable keys last.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Basename identity of a daily note, e.g. `2024-03-04`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for NoteId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NoteId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Period covered by a periodic note; only `Day` notes are produced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Self::Day, Self::Month, Self::Year];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Day => "day-",
            Self::Month => "month-",
            Self::Year => "year-",
        }
    }
}

/// Builds the listing key for a note of `granularity` on `date`.
pub fn note_key(granularity: Granularity, date: NaiveDate) -> String {
    format!("{}{}", granularity.prefix(), date.format("%Y-%m-%d"))
}

/// Removes the granularity prefix from a listing key.
pub fn strip_granularity(key: &str) -> &str {
    Granularity::ALL
        .iter()
        .find_map(|granularity| key.strip_prefix(granularity.prefix()))
        .unwrap_or(key)
}

/// Parses the date part of a listing key.
pub fn key_date(key: &str) -> Option<NaiveDate> {
    let stripped = strip_granularity(key);
    let date_part = stripped.get(..10).unwrap_or(stripped);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Sorts listing keys newest first.
pub fn sort_keys_desc(keys: &mut [String]) {
    keys.sort_by_key(|key| Reverse(key_date(key)));
}

/// Listing metadata for one daily note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    pub id: NoteId,
    /// Vault-relative path of the note file.
    pub path: PathBuf,
    pub date: NaiveDate,
}
