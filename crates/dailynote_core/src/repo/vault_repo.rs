//! Vault storage contract and filesystem implementation.
//!
//! # Responsibility
//! - Define the storage operations the transition controller consumes.
//! - Map daily-note identities to `<noteFolder>/<id>.md` files under a vault root.
//! - Resolve "today's note" and "is this a daily note" boundary questions.
//!
//! # Invariants
//! - A `NoteId` never contains a path separator; such ids are rejected.
//! - Renames and creations never overwrite an existing file.
//! - Listing is a non-recursive scan of the daily folder; only `.md` files
//!   whose basename parses with the configured date format are daily notes.

use crate::model::note::{note_key, Granularity, NoteId, NoteMeta};
use crate::model::settings::Settings;
use crate::text::fuzzy::fuzzy_match;
use crate::text::moment::{format_moment, parse_moment};
use crate::text::template::render_template;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

const NOTE_EXTENSION: &str = "md";

pub type VaultResult<T> = Result<T, VaultError>;

/// Storage failure surfaced to the transition caller.
#[derive(Debug)]
pub enum VaultError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    NoteNotFound(NoteId),
    /// Target path is already occupied.
    NoteExists(PathBuf),
    InvalidNoteName(String),
}

impl Display for VaultError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "vault io error at `{}`: {source}", path.display()),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::NoteExists(path) => write!(f, "note already exists: {}", path.display()),
            Self::InvalidNoteName(name) => write!(f, "invalid note name `{name}`"),
        }
    }
}

impl Error for VaultError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Storage collaborator consumed by the transition controller.
pub trait VaultRepository {
    fn read_note(&self, id: &NoteId) -> VaultResult<String>;
    /// Replaces the full text of an existing note.
    fn write_note(&self, id: &NoteId, content: &str) -> VaultResult<()>;
    /// Moves a note to `dest`, a vault-relative file path.
    fn rename_note(&self, id: &NoteId, dest: &Path) -> VaultResult<()>;
    /// Daily notes keyed by granularity-prefixed date keys (`day-2024-03-04`).
    fn list_notes(&self) -> VaultResult<BTreeMap<String, NoteMeta>>;
    /// Creates the note for `date` from the configured template.
    fn create_note(&self, date: NaiveDate) -> VaultResult<NoteId>;
    /// Returns the existing note for `date`, if any.
    fn note_for_date(&self, date: NaiveDate) -> VaultResult<Option<NoteId>>;
}

impl<T: VaultRepository + ?Sized> VaultRepository for &T {
    fn read_note(&self, id: &NoteId) -> VaultResult<String> {
        (**self).read_note(id)
    }

    fn write_note(&self, id: &NoteId, content: &str) -> VaultResult<()> {
        (**self).write_note(id, content)
    }

    fn rename_note(&self, id: &NoteId, dest: &Path) -> VaultResult<()> {
        (**self).rename_note(id, dest)
    }

    fn list_notes(&self) -> VaultResult<BTreeMap<String, NoteMeta>> {
        (**self).list_notes()
    }

    fn create_note(&self, date: NaiveDate) -> VaultResult<NoteId> {
        (**self).create_note(date)
    }

    fn note_for_date(&self, date: NaiveDate) -> VaultResult<Option<NoteId>> {
        (**self).note_for_date(date)
    }
}

/// Where daily notes live inside a vault and how they are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    /// Vault-relative daily folder; empty means the vault root.
    pub note_folder: PathBuf,
    /// Moment-style pattern of note basenames.
    pub date_format: String,
    /// Vault-relative template path, `.md` optional.
    pub template: Option<PathBuf>,
}

impl VaultLayout {
    pub fn from_settings(settings: &Settings) -> Self {
        let folder = settings.note_folder.trim().trim_matches('/');
        let template = settings.template.trim();
        let date_format = settings.date_format.trim();
        Self {
            note_folder: PathBuf::from(folder),
            date_format: if date_format.is_empty() {
                Settings::default().date_format
            } else {
                date_format.to_string()
            },
            template: (!template.is_empty()).then(|| PathBuf::from(template)),
        }
    }
}

impl Default for VaultLayout {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Vault rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    layout: VaultLayout,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>, layout: VaultLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    /// Identity the note for `date` has, whether or not it exists.
    pub fn note_id_for_date(&self, date: NaiveDate) -> NoteId {
        NoteId::new(format_moment(date, &self.layout.date_format))
    }

    /// Vault-relative path of the note `id`.
    pub fn note_relative_path(&self, id: &NoteId) -> PathBuf {
        self.layout
            .note_folder
            .join(format!("{}.{NOTE_EXTENSION}", id.as_str()))
    }

    pub fn note_path(&self, id: &NoteId) -> PathBuf {
        self.root.join(self.note_relative_path(id))
    }

    /// Whether `path` (absolute inside the vault, or vault-relative) is a
    /// daily note: directly inside the daily folder, `.md`, and named by
    /// the date format.
    pub fn is_daily_note(&self, path: &Path) -> bool {
        self.note_id_for_path(path).is_some()
    }

    /// The identity of the daily note at `path`, if it is one.
    pub fn note_id_for_path(&self, path: &Path) -> Option<NoteId> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if relative.extension().and_then(|ext| ext.to_str()) != Some(NOTE_EXTENSION) {
            return None;
        }
        let parent = relative.parent().unwrap_or_else(|| Path::new(""));
        if normalize(parent) != normalize(&self.layout.note_folder) {
            return None;
        }
        let stem = relative.file_stem()?.to_str()?;
        parse_moment(stem, &self.layout.date_format)?;
        Some(NoteId::new(stem))
    }

    /// Vault folders (relative, `/`-separated) matching `query`, sorted.
    /// Hidden folders and their subtrees are skipped.
    pub fn list_folders(&self, query: &str) -> VaultResult<Vec<String>> {
        let mut found = Vec::new();
        let mut pending = vec![PathBuf::new()];
        while let Some(relative) = pending.pop() {
            let absolute = self.root.join(&relative);
            let entries = std::fs::read_dir(&absolute).map_err(|source| VaultError::Io {
                path: absolute.clone(),
                source,
            })?;
            for entry in entries {
                let entry = entry.map_err(|source| VaultError::Io {
                    path: absolute.clone(),
                    source,
                })?;
                let is_dir = entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false);
                let name = entry.file_name().to_string_lossy().into_owned();
                if !is_dir || name.starts_with('.') {
                    continue;
                }
                let child = relative.join(&name);
                let display = normalize(&child);
                if fuzzy_match(&display, query) {
                    found.push(display);
                }
                pending.push(child);
            }
        }
        found.sort();
        Ok(found)
    }

    /// Reads the configured template. A missing or unset template is empty.
    pub fn read_template(&self) -> VaultResult<String> {
        let Some(template) = &self.layout.template else {
            return Ok(String::new());
        };
        let exact = self.root.join(template);
        let with_extension = self
            .root
            .join(format!("{}.{NOTE_EXTENSION}", template.display()));
        for candidate in [exact, with_extension] {
            match std::fs::read_to_string(&candidate) {
                Ok(text) => return Ok(text),
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(source) => {
                    return Err(VaultError::Io {
                        path: candidate,
                        source,
                    })
                }
            }
        }
        warn!(
            "event=template_read module=repo status=missing template={}",
            template.display()
        );
        Ok(String::new())
    }

    fn existing_note_path(&self, id: &NoteId) -> VaultResult<PathBuf> {
        validate_id(id)?;
        let path = self.note_path(id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(VaultError::NoteNotFound(id.clone()))
        }
    }
}

impl VaultRepository for FsVault {
    fn read_note(&self, id: &NoteId) -> VaultResult<String> {
        let path = self.existing_note_path(id)?;
        std::fs::read_to_string(&path).map_err(|source| VaultError::Io { path, source })
    }

    fn write_note(&self, id: &NoteId, content: &str) -> VaultResult<()> {
        let path = self.existing_note_path(id)?;
        std::fs::write(&path, content).map_err(|source| VaultError::Io { path, source })?;
        debug!(
            "event=note_write module=repo status=ok note={} bytes={}",
            id,
            content.len()
        );
        Ok(())
    }

    fn rename_note(&self, id: &NoteId, dest: &Path) -> VaultResult<()> {
        let source_path = self.existing_note_path(id)?;
        if dest.is_absolute() || dest.components().any(|c| c == Component::ParentDir) {
            return Err(VaultError::InvalidNoteName(dest.display().to_string()));
        }
        let target = self.root.join(dest);
        if target.exists() {
            return Err(VaultError::NoteExists(target));
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|source| VaultError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::rename(&source_path, &target).map_err(|source| VaultError::Io {
            path: target.clone(),
            source,
        })?;
        debug!(
            "event=note_rename module=repo status=ok note={} dest={}",
            id,
            dest.display()
        );
        Ok(())
    }

    fn list_notes(&self) -> VaultResult<BTreeMap<String, NoteMeta>> {
        let folder = self.root.join(&self.layout.note_folder);
        let entries = match std::fs::read_dir(&folder) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(VaultError::Io {
                    path: folder,
                    source,
                })
            }
        };

        let mut notes = BTreeMap::new();
        for entry in entries {
            let entry = entry.map_err(|source| VaultError::Io {
                path: folder.clone(),
                source,
            })?;
            if !entry.file_type().map(|kind| kind.is_file()).unwrap_or(false) {
                continue;
            }
            let relative = self.layout.note_folder.join(entry.file_name());
            let Some(id) = self.note_id_for_path(&relative) else {
                continue;
            };
            let Some(date) = parse_moment(id.as_str(), &self.layout.date_format) else {
                continue;
            };
            notes.insert(
                note_key(Granularity::Day, date),
                NoteMeta {
                    id,
                    path: relative,
                    date,
                },
            );
        }
        Ok(notes)
    }

    fn create_note(&self, date: NaiveDate) -> VaultResult<NoteId> {
        let id = self.note_id_for_date(date);
        validate_id(&id)?;
        let path = self.note_path(&id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| VaultError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let template = self.read_template()?;
        let content = render_template(&template, date, &self.layout.date_format);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                return Err(VaultError::NoteExists(path))
            }
            Err(source) => return Err(VaultError::Io { path, source }),
        };
        file.write_all(content.as_bytes())
            .map_err(|source| VaultError::Io {
                path: path.clone(),
                source,
            })?;

        info!("event=note_create module=repo status=ok note={}", id);
        Ok(id)
    }

    fn note_for_date(&self, date: NaiveDate) -> VaultResult<Option<NoteId>> {
        let id = self.note_id_for_date(date);
        validate_id(&id)?;
        Ok(self.note_path(&id).is_file().then_some(id))
    }
}

fn validate_id(id: &NoteId) -> VaultResult<()> {
    let name = id.as_str();
    if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(VaultError::InvalidNoteName(name.to_string()));
    }
    Ok(())
}

fn normalize(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
