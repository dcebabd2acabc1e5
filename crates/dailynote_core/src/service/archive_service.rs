//! Retention pass moving old daily notes into the archive folder.
//!
//! # Responsibility
//! - Keep the newest `archiveMaxNotes` daily notes in place and move the rest.
//!
//! # Invariants
//! - Eviction is oldest-first over keys sorted newest-first by date.
//! - The note being processed is never moved.
//! - A key whose note cannot be found ends the pass early without error.

use crate::model::note::{sort_keys_desc, NoteId};
use crate::repo::vault_repo::{VaultError, VaultRepository, VaultResult};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Result of one archive pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archived: Vec<NoteId>,
    /// The pass stopped at a missing note.
    pub aborted: bool,
}

/// Moves every daily note beyond the newest `max_notes` into `archive_folder`.
///
/// Storage errors other than a vanished note propagate.
pub fn archive_notes<V: VaultRepository>(
    vault: &V,
    archive_folder: &str,
    max_notes: usize,
    current: &NoteId,
) -> VaultResult<ArchiveReport> {
    let notes = vault.list_notes()?;
    let mut keys: Vec<String> = notes.keys().cloned().collect();
    sort_keys_desc(&mut keys);

    let folder = Path::new(archive_folder.trim().trim_end_matches('/'));
    let mut report = ArchiveReport::default();

    while keys.len() > max_notes {
        let Some(key) = keys.pop() else {
            break;
        };
        let Some(meta) = notes.get(&key) else {
            warn!(
                "event=archive module=service status=abort reason=missing_note key={}",
                key
            );
            report.aborted = true;
            break;
        };
        if meta.id == *current {
            debug!(
                "event=archive module=service status=skip reason=current_note note={}",
                meta.id
            );
            continue;
        }

        let dest = archive_destination(folder, &meta.id, &meta.path);
        match vault.rename_note(&meta.id, &dest) {
            Ok(()) => report.archived.push(meta.id.clone()),
            Err(VaultError::NoteNotFound(id)) => {
                warn!(
                    "event=archive module=service status=abort reason=missing_note note={}",
                    id
                );
                report.aborted = true;
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}

fn archive_destination(folder: &Path, id: &NoteId, source: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) => folder.join(name),
        None => folder.join(format!("{id}.md")),
    }
}
