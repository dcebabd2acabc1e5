//! Persisted configuration record.
//!
//! # Responsibility
//! - Define every user-editable field with its default.
//! - Own the Processing Log bookkeeping rules (mark on entry, shift on delete).
//!
//! # Invariants
//! - Field names serialize in camelCase and are the persistence keys.
//! - Loading merges stored fields over `Settings::default()`; a missing field
//!   is never an error.
//! - A copy pair serializes as a two-element `[source, dest]` array.

use crate::model::note::NoteId;
use crate::text::embed::WEEKDAY_NAMES;
use serde::{Deserialize, Serialize};

/// One `(source heading, destination heading)` content-copy pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct CopyPair {
    pub source: String,
    pub dest: String,
}

impl CopyPair {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Pairs with either side blank are skipped by the copy step.
    pub fn is_complete(&self) -> bool {
        !self.source.trim().is_empty() && !self.dest.trim().is_empty()
    }
}

impl From<(String, String)> for CopyPair {
    fn from((source, dest): (String, String)) -> Self {
        Self { source, dest }
    }
}

impl From<CopyPair> for (String, String) {
    fn from(pair: CopyPair) -> Self {
        (pair.source, pair.dest)
    }
}

/// Two-slot memory of the most recently processed note identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingLog {
    #[serde(default)]
    pub curr: String,
    #[serde(default)]
    pub prev: String,
}

impl ProcessingLog {
    /// Whether `note` occupies either slot (already processed).
    pub fn contains(&self, note: &NoteId) -> bool {
        note == self.curr.as_str() || note == self.prev.as_str()
    }

    /// Shifts `curr` into `prev` and records `note` as current.
    pub fn mark(&mut self, note: &NoteId) {
        self.prev = std::mem::take(&mut self.curr);
        self.curr = note.as_str().to_string();
    }

    /// Applies a deletion of `note`. Returns whether any slot changed.
    ///
    /// A deleted `prev` is cleared first; a deleted `curr` then takes the
    /// (possibly just cleared) `prev` value.
    pub fn forget(&mut self, note: &NoteId) -> bool {
        let mut changed = false;
        if note == self.prev.as_str() {
            self.prev.clear();
            changed = true;
        }
        if note == self.curr.as_str() {
            self.curr = self.prev.clone();
            changed = true;
        }
        changed
    }
}

/// Full configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Enables retention pruning of old daily notes.
    pub archive: bool,
    /// Notes kept unarchived (the note being processed included).
    pub archive_max_notes: usize,
    /// Vault-relative destination folder for archived notes.
    pub archive_folder: String,
    pub task_rollover: bool,
    /// Destination heading literal for rolled-over tasks.
    pub task_heading: String,
    pub copy_content_headings: Vec<CopyPair>,
    /// Enables day-of-week titling.
    pub dotw: bool,
    /// Sunday-first title text; entries may contain embeddables.
    pub dotw_lst: [String; 7],
    /// Display text for the previous-note link; may contain embeddables.
    pub prev_note_text: String,
    /// Processing Log.
    pub modified: ProcessingLog,
    /// Vault-relative folder holding daily notes.
    pub note_folder: String,
    /// Moment-style pattern of daily-note file names.
    pub date_format: String,
    /// Vault-relative template used when creating a daily note.
    pub template: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            archive: false,
            archive_max_notes: 7,
            archive_folder: String::new(),
            task_rollover: true,
            task_heading: String::new(),
            copy_content_headings: vec![CopyPair::default()],
            dotw: false,
            dotw_lst: WEEKDAY_NAMES.map(str::to_string),
            prev_note_text: String::new(),
            modified: ProcessingLog::default(),
            note_folder: String::new(),
            date_format: "YYYY-MM-DD".to_string(),
            template: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn copy_pairs_serialize_as_arrays() {
        let value = serde_json::to_value(CopyPair::new("## Notes", "## Yesterday")).unwrap();
        assert_eq!(value, json!(["## Notes", "## Yesterday"]));
    }

    #[test]
    fn partial_record_is_filled_from_defaults() {
        let settings: Settings =
            serde_json::from_value(json!({ "taskHeading": "## Tasks", "archive": true })).unwrap();
        assert_eq!(settings.task_heading, "## Tasks");
        assert!(settings.archive);
        assert_eq!(settings.archive_max_notes, 7);
        assert_eq!(settings.dotw_lst[0], "Sunday");
        assert_eq!(settings.copy_content_headings, vec![CopyPair::default()]);
    }

    #[test]
    fn marking_shifts_current_into_previous() {
        let mut log = ProcessingLog::default();
        log.mark(&NoteId::new("2024-03-03"));
        log.mark(&NoteId::new("2024-03-04"));
        assert_eq!(log.prev, "2024-03-03");
        assert_eq!(log.curr, "2024-03-04");
        assert!(log.contains(&NoteId::new("2024-03-03")));
        assert!(!log.contains(&NoteId::new("2024-03-02")));
    }

    #[test]
    fn forgetting_current_promotes_previous() {
        let mut log = ProcessingLog {
            curr: "2024-03-04".into(),
            prev: "2024-03-03".into(),
        };
        assert!(log.forget(&NoteId::new("2024-03-04")));
        assert_eq!(log.curr, "2024-03-03");
        assert_eq!(log.prev, "2024-03-03");

        assert!(log.forget(&NoteId::new("2024-03-03")));
        assert_eq!(log.curr, "");
        assert_eq!(log.prev, "");
        assert!(!log.forget(&NoteId::new("2024-03-01")));
    }
}
