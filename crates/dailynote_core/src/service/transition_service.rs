//! Daily-note transition controller.
//!
//! # Responsibility
//! - Guard each note with the Processing Log so it is transformed once.
//! - Sequence archive, task rollover, content copy, day title, previous link
//!   and embeddable expansion over the (previous, current) note pair.
//! - Apply deletion notifications to the Processing Log.
//!
//! # Invariants
//! - The log is marked and persisted before the first note mutation.
//! - An already-logged note produces zero storage writes.
//! - Steps run in a fixed order; each step sees the result of the one before.
//! - A step writes only when it changed the note text.
//! - Storage failures abort the remaining steps; nothing is rolled back.

use crate::model::note::{NoteId, NoteMeta};
use crate::model::settings::{CopyPair, Settings};
use crate::repo::settings_repo::{SettingsError, SettingsRepository};
use crate::repo::vault_repo::{VaultError, VaultRepository, VaultResult};
use crate::service::archive_service::archive_notes;
use crate::text::embed::{expand_for, expand_previous_for, parse_reference_date, ReferenceDate};
use crate::text::heading::{extract_section, trim_blank_lines};
use crate::text::merge::{merge_at_heading, MergeOutcome};
use crate::text::tasks::{extract_incomplete_tasks, prune_empty_task_lines};
use crate::text::title::{apply_day_title, day_title_for};
use chrono::NaiveDate;
use log::{debug, error, info};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Failure that ends a transition early.
#[derive(Debug)]
pub enum TransitionError {
    Vault(VaultError),
    Settings(SettingsError),
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vault(err) => write!(f, "{err}"),
            Self::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransitionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Vault(err) => Some(err),
            Self::Settings(err) => Some(err),
        }
    }
}

impl From<VaultError> for TransitionError {
    fn from(value: VaultError) -> Self {
        Self::Vault(value)
    }
}

impl From<SettingsError> for TransitionError {
    fn from(value: SettingsError) -> Self {
        Self::Settings(value)
    }
}

/// One stage of a transition, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Archive,
    TaskRollover,
    /// Copy pair at this list index.
    CopyContent(usize),
    DayTitle,
    PreviousLink,
    ExpandEmbeddables,
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive => f.write_str("archive"),
            Self::TaskRollover => f.write_str("task_rollover"),
            Self::CopyContent(index) => write!(f, "copy_content[{index}]"),
            Self::DayTitle => f.write_str("day_title"),
            Self::PreviousLink => f.write_str("previous_link"),
            Self::ExpandEmbeddables => f.write_str("expand_embeddables"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepStatus {
    /// The note text changed and was persisted.
    Written,
    /// The step ran but produced identical text.
    NoChange,
    /// Disabled, unconfigured, or its input structure was absent.
    NotApplicable { reason: &'static str },
    Archived { count: usize },
}

impl Display for StepStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Written => f.write_str("written"),
            Self::NoChange => f.write_str("no_change"),
            Self::NotApplicable { reason } => write!(f, "skipped reason={reason}"),
            Self::Archived { count } => write!(f, "archived count={count}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The note was already in the Processing Log; nothing ran.
    AlreadyProcessed,
    Processed,
}

/// What one transition did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReport {
    pub run_id: Uuid,
    pub note: NoteId,
    pub previous: Option<NoteId>,
    pub outcome: TransitionOutcome,
    pub steps: Vec<StepOutcome>,
    /// Note writes performed; settings saves are not counted.
    pub writes: usize,
}

impl TransitionReport {
    pub fn status_of(&self, step: Step) -> Option<&StepStatus> {
        self.steps
            .iter()
            .find(|outcome| outcome.step == step)
            .map(|outcome| &outcome.status)
    }
}

/// Orchestrates daily-note transitions over a vault and a settings store.
pub struct TransitionService<V: VaultRepository, S: SettingsRepository> {
    vault: V,
    settings: S,
}

impl<V: VaultRepository, S: SettingsRepository> TransitionService<V, S> {
    pub fn new(vault: V, settings: S) -> Self {
        Self { vault, settings }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Whether `note` currently occupies either Processing Log slot.
    pub fn is_processed(&self, note: &NoteId) -> Result<bool, TransitionError> {
        Ok(self.settings.load()?.modified.contains(note))
    }

    /// Ensures the note for `date` exists, creating it from the template when
    /// missing, then runs the transition on it.
    pub fn run_for_date(&self, date: NaiveDate) -> Result<TransitionReport, TransitionError> {
        let note = match self.vault.note_for_date(date)? {
            Some(note) => note,
            None => self.vault.create_note(date)?,
        };
        self.run(&note)
    }

    /// Runs the transition for `note`.
    ///
    /// # Errors
    /// - Settings cannot be loaded or the log mark cannot be saved.
    /// - Any read or write of a note fails; earlier writes stay in place.
    pub fn run(&self, note: &NoteId) -> Result<TransitionReport, TransitionError> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();

        let mut settings = self.settings.load()?;
        if settings.modified.contains(note) {
            info!(
                "event=transition module=service status=skip reason=already_processed run_id={} note={}",
                run_id, note
            );
            return Ok(TransitionReport {
                run_id,
                note: note.clone(),
                previous: None,
                outcome: TransitionOutcome::AlreadyProcessed,
                steps: Vec::new(),
                writes: 0,
            });
        }

        settings.modified.mark(note);
        self.settings.save(&settings)?;
        info!(
            "event=transition module=service status=start run_id={} note={}",
            run_id, note
        );

        match self.process(run_id, note, &settings) {
            Ok(report) => {
                info!(
                    "event=transition module=service status=ok run_id={} note={} previous={} writes={} duration_ms={}",
                    run_id,
                    note,
                    report.previous.as_ref().map_or("-", NoteId::as_str),
                    report.writes,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=transition module=service status=error run_id={} note={} duration_ms={} error={}",
                    run_id,
                    note,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Applies a deletion of `note` to the Processing Log. Returns whether
    /// the log changed (and was saved).
    pub fn note_deleted(&self, note: &NoteId) -> Result<bool, TransitionError> {
        let mut settings = self.settings.load()?;
        if !settings.modified.forget(note) {
            return Ok(false);
        }
        self.settings.save(&settings)?;
        info!(
            "event=note_deleted module=service status=ok note={} curr={} prev={}",
            note, settings.modified.curr, settings.modified.prev
        );
        Ok(true)
    }

    fn process(
        &self,
        run_id: Uuid,
        note: &NoteId,
        settings: &Settings,
    ) -> Result<TransitionReport, TransitionError> {
        let notes = self.vault.list_notes()?;
        let previous = previous_note(&notes, note);
        let reference = ReferenceDate::new(note.as_str(), listed_date(&notes, note));
        let previous_reference = previous
            .as_ref()
            .map(|id| ReferenceDate::new(id.as_str(), listed_date(&notes, id)));
        // Read before archiving can move it.
        let previous_text = match &previous {
            Some(id) => Some(self.vault.read_note(id)?),
            None => None,
        };

        let mut current = WorkingNote {
            vault: &self.vault,
            id: note,
            text: self.vault.read_note(note)?,
            writes: 0,
        };
        let mut steps = Vec::new();
        let mut record = |step: Step, status: StepStatus| {
            debug!(
                "event=transition_step module=service run_id={} note={} step={} status={}",
                run_id, note, step, status
            );
            steps.push(StepOutcome { step, status });
        };

        record(Step::Archive, self.archive_step(settings, note)?);
        record(
            Step::TaskRollover,
            rollover_step(settings, previous_text.as_deref(), &mut current)?,
        );
        for (index, pair) in settings.copy_content_headings.iter().enumerate() {
            record(
                Step::CopyContent(index),
                copy_step(pair, previous_text.as_deref(), &mut current)?,
            );
        }
        record(Step::DayTitle, title_step(settings, reference, &mut current)?);
        record(
            Step::PreviousLink,
            previous_link_step(settings, previous_reference, &mut current)?,
        );
        let expanded = expand_for(&current.text, reference);
        record(Step::ExpandEmbeddables, current.apply(expanded)?);

        Ok(TransitionReport {
            run_id,
            note: note.clone(),
            previous,
            outcome: TransitionOutcome::Processed,
            steps,
            writes: current.writes,
        })
    }

    fn archive_step(&self, settings: &Settings, note: &NoteId) -> VaultResult<StepStatus> {
        if !settings.archive {
            return Ok(StepStatus::NotApplicable { reason: "disabled" });
        }
        if settings.archive_folder.trim().is_empty() {
            return Ok(StepStatus::NotApplicable {
                reason: "no archive folder",
            });
        }
        let report = archive_notes(
            &self.vault,
            &settings.archive_folder,
            settings.archive_max_notes,
            note,
        )?;
        Ok(StepStatus::Archived {
            count: report.archived.len(),
        })
    }
}

/// The current note's text plus the write-through bookkeeping.
struct WorkingNote<'a, V: VaultRepository> {
    vault: &'a V,
    id: &'a NoteId,
    text: String,
    writes: usize,
}

impl<V: VaultRepository> WorkingNote<'_, V> {
    fn apply(&mut self, updated: String) -> VaultResult<StepStatus> {
        if updated == self.text {
            return Ok(StepStatus::NoChange);
        }
        self.vault.write_note(self.id, &updated)?;
        self.text = updated;
        self.writes += 1;
        Ok(StepStatus::Written)
    }
}

fn rollover_step<V: VaultRepository>(
    settings: &Settings,
    previous_text: Option<&str>,
    current: &mut WorkingNote<'_, V>,
) -> VaultResult<StepStatus> {
    if !settings.task_rollover {
        return Ok(StepStatus::NotApplicable { reason: "disabled" });
    }
    if settings.task_heading.trim().is_empty() {
        return Ok(StepStatus::NotApplicable {
            reason: "no task heading",
        });
    }
    let Some(previous_text) = previous_text else {
        return Ok(StepStatus::NotApplicable {
            reason: "no previous note",
        });
    };

    let tasks = extract_incomplete_tasks(previous_text);
    if tasks.is_empty() {
        return Ok(StepStatus::NotApplicable {
            reason: "no incomplete tasks",
        });
    }

    let pruned = prune_empty_task_lines(&current.text);
    match merge_at_heading(&pruned, &settings.task_heading, &tasks.join("\n")) {
        MergeOutcome::Merged(updated) => current.apply(updated),
        MergeOutcome::HeadingMissing => Ok(StepStatus::NotApplicable {
            reason: "task heading missing",
        }),
    }
}

fn copy_step<V: VaultRepository>(
    pair: &CopyPair,
    previous_text: Option<&str>,
    current: &mut WorkingNote<'_, V>,
) -> VaultResult<StepStatus> {
    if !pair.is_complete() {
        return Ok(StepStatus::NotApplicable {
            reason: "blank heading",
        });
    }
    let Some(previous_text) = previous_text else {
        return Ok(StepStatus::NotApplicable {
            reason: "no previous note",
        });
    };
    let Some(section) = extract_section(previous_text, &pair.source) else {
        return Ok(StepStatus::NotApplicable {
            reason: "source heading missing",
        });
    };
    let content = trim_blank_lines(section);
    if content.is_empty() {
        return Ok(StepStatus::NotApplicable {
            reason: "empty section",
        });
    }

    match merge_at_heading(&current.text, &pair.dest, content) {
        MergeOutcome::Merged(updated) => current.apply(updated),
        MergeOutcome::HeadingMissing => Ok(StepStatus::NotApplicable {
            reason: "destination heading missing",
        }),
    }
}

fn title_step<V: VaultRepository>(
    settings: &Settings,
    reference: ReferenceDate<'_>,
    current: &mut WorkingNote<'_, V>,
) -> VaultResult<StepStatus> {
    if !settings.dotw {
        return Ok(StepStatus::NotApplicable { reason: "disabled" });
    }
    let Some(title) = day_title_for(&settings.dotw_lst, reference) else {
        return Ok(StepStatus::NotApplicable {
            reason: "no title for date",
        });
    };
    let updated = apply_day_title(&current.text, &title);
    current.apply(updated)
}

fn previous_link_step<V: VaultRepository>(
    settings: &Settings,
    previous: Option<ReferenceDate<'_>>,
    current: &mut WorkingNote<'_, V>,
) -> VaultResult<StepStatus> {
    let Some(previous) = previous else {
        return Ok(StepStatus::NotApplicable {
            reason: "no previous note",
        });
    };
    let updated = expand_previous_for(&current.text, previous, &settings.prev_note_text);
    current.apply(updated)
}

/// Date of `note` as the vault listed it, else read from an ISO-like id.
fn listed_date(notes: &BTreeMap<String, NoteMeta>, note: &NoteId) -> Option<NaiveDate> {
    notes
        .values()
        .find(|meta| meta.id == *note)
        .map(|meta| meta.date)
        .or_else(|| parse_reference_date(note.as_str()))
}

/// Picks the note preceding `current`: the newest listed note dated strictly
/// before it. When the current note's date is unknown, the newest other note.
fn previous_note(notes: &BTreeMap<String, NoteMeta>, current: &NoteId) -> Option<NoteId> {
    let current_date = listed_date(notes, current);

    let mut others: Vec<&NoteMeta> = notes.values().filter(|meta| meta.id != *current).collect();
    others.sort_by_key(|meta| Reverse(meta.date));

    let found = match current_date {
        Some(date) => others.into_iter().find(|meta| meta.date < date),
        None => others.into_iter().next(),
    };
    found.map(|meta| meta.id.clone())
}
