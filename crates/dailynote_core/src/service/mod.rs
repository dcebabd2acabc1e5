//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate text-engine calls over repository reads and writes.
//! - Keep CLI/host adapters decoupled from storage details.

pub mod archive_service;
pub mod settings_service;
pub mod transition_service;
