//! Note repository: domain contracts over the persistent store.
//!
//! # Responsibility
//! - Translate user intent (create/rename/edit/delete/list) into store calls.
//! - Turn every store failure into a typed `NoteError` value.
//!
//! # Invariants
//! - Validation failures are reported before any storage access.
//! - Affected-count 0 on update is reported as `NotFound`, never as success.

pub mod note_repo;
