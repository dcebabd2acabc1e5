//! Storage collaborators.
//!
//! # Responsibility
//! - Define the vault and settings contracts the services consume.
//! - Provide the filesystem vault and the SQLite settings store.
//!
//! # Invariants
//! - Repository traits are implemented for `&T` so services can borrow.
//! - Not-found of optional document structure is never a repository error.

pub mod settings_repo;
pub mod vault_repo;
