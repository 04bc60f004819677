//! Note domain model.
//!
//! # Responsibility
//! - Define the note record exchanged between store, repository and views.
//! - Own title normalization and the blank document shape.
//!
//! # Invariants
//! - Persisted notes are identified by a store-assigned `NoteId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod note;
