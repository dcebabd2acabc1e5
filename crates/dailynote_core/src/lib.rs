//! Daily-note lifecycle maintenance engine.
//! This crate is the single source of truth for the text transformations and
//! the transition sequencing; hosts only adapt events and storage.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod text;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::note::{NoteId, NoteMeta};
pub use model::settings::{CopyPair, ProcessingLog, Settings};
pub use repo::settings_repo::{
    SettingsError, SettingsRepository, SettingsResult, SqliteSettingsRepository,
};
pub use repo::vault_repo::{FsVault, VaultError, VaultLayout, VaultRepository, VaultResult};
pub use service::archive_service::{archive_notes, ArchiveReport};
pub use service::settings_service::SettingsService;
pub use service::transition_service::{
    Step, StepOutcome, StepStatus, TransitionError, TransitionOutcome, TransitionReport,
    TransitionService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
