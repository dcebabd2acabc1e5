//! Domain model for daily-note maintenance.
//!
//! # Responsibility
//! - Define note identity/listing types and the persisted configuration record.
//!
//! # Invariants
//! - Notes are identified by their date-derived basename (`NoteId`).
//! - The configuration record is the single home of the Processing Log.

pub mod note;
pub mod settings;
