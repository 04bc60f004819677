//! Persistent note store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the durable keyed storage contract used by the repository.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - The store assigns ids; callers never choose them.
//! - `update_fields` writes only the fields it is given and never inserts.
//! - `delete` is idempotent.
//! - Listing is ordered by `last_updated_at DESC, id DESC`.
//! - A written record receives a recency stamp newer than every other
//!   record, so it lists first even within one clock tick.

use crate::db::DbError;
use crate::model::note::{Note, NoteChanges, NoteDraft, NoteId};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of the underlying storage engine.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted content could not be decoded as a document.
    Codec(serde_json::Error),
    /// Persisted row violates the note invariants.
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "invalid persisted note content: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Durable keyed storage for notes with one recency ordering.
pub trait NoteStore {
    /// Persists a new record and returns its freshly assigned id.
    ///
    /// `created_at` is stored as given; `last_updated_at` may be advanced
    /// past the draft's value to keep recency stamps unique.
    fn add(&self, draft: &NoteDraft) -> StoreResult<NoteId>;
    /// Merges `changes` into the record; returns the affected count (0 or 1).
    fn update_fields(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<usize>;
    /// Removes the record if present.
    fn delete(&self, id: NoteId) -> StoreResult<()>;
    /// Returns every record, most recently updated first.
    fn list_all_ordered_by_recency(&self) -> StoreResult<Vec<Note>>;
    /// Returns one record.
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Returns the number of stored records.
    fn count(&self) -> StoreResult<u64>;
}

impl<S: NoteStore + ?Sized> NoteStore for &S {
    fn add(&self, draft: &NoteDraft) -> StoreResult<NoteId> {
        (**self).add(draft)
    }

    fn update_fields(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<usize> {
        (**self).update_fields(id, changes)
    }

    fn delete(&self, id: NoteId) -> StoreResult<()> {
        (**self).delete(id)
    }

    fn list_all_ordered_by_recency(&self) -> StoreResult<Vec<Note>> {
        (**self).list_all_ordered_by_recency()
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        (**self).get(id)
    }

    fn count(&self) -> StoreResult<u64> {
        (**self).count()
    }
}
