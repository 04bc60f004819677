//! Note use-case repository.
//!
//! # Responsibility
//! - Provide create/get/list/update-title/update-content/delete for notes.
//! - Normalize titles and substitute the configured default.
//!
//! # Invariants
//! - Blank titles are rejected before the store is touched.
//! - Every successful update refreshes `last_updated_at`.
//! - Delete is idempotent; a missing note is still `Ok`.

use crate::model::note::{
    normalize_title, now_ms, DefaultTitle, Document, Note, NoteChanges, NoteDraft, NoteId,
    TitleValidationError,
};
use crate::store::{NoteStore, StoreError, StoreResult};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteResult<T> = Result<T, NoteError>;

/// Failure outcome of a repository operation.
#[derive(Debug)]
pub enum NoteError {
    /// Input rejected before any I/O.
    InvalidInput(String),
    /// Target note does not exist (it may have been deleted concurrently).
    NotFound(NoteId),
    /// Underlying store failed; the operation may be retried.
    Storage {
        context: &'static str,
        source: StoreError,
    },
}

impl NoteError {
    fn storage(context: &'static str, source: StoreError) -> Self {
        Self::Storage { context, source }
    }

    /// Stable machine-readable label for envelopes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Storage { .. } => "failed",
        }
    }
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "{message}"),
            Self::NotFound(id) => write!(f, "no note found with id {id}"),
            Self::Storage { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage { source, .. } => Some(source),
            Self::InvalidInput(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<TitleValidationError> for NoteError {
    fn from(value: TitleValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

/// Repository facade over a note store.
pub struct NoteRepository<S: NoteStore> {
    store: S,
    default_title: DefaultTitle,
}

impl<S: NoteStore> NoteRepository<S> {
    /// Creates a repository using the fixed default title.
    pub fn new(store: S) -> Self {
        Self::with_default_title(store, DefaultTitle::default())
    }

    pub fn with_default_title(store: S, default_title: DefaultTitle) -> Self {
        Self {
            store,
            default_title,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Releases the store, e.g. to close it explicitly.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Creates a note with a blank document.
    ///
    /// A missing or blank title is replaced by the configured default. When
    /// the insert succeeds but reading the row back fails, the returned note
    /// carries the draft's timestamps, which can trail the stored recency
    /// stamp.
    pub fn create_note(&self, title: Option<&str>) -> NoteResult<Note> {
        let now = now_ms();
        let title = match title.map(str::trim) {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_string(),
            _ => self.default_title.resolve(now),
        };
        let draft = NoteDraft::blank(title, now);

        let id = match self.store.add(&draft) {
            Ok(id) => id,
            Err(err) => {
                error!("event=note_create module=repo status=error error={err}");
                return Err(NoteError::storage("failed to create note", err));
            }
        };
        // The row exists from here on; the caller must see success.
        let note = match self.read_back(id) {
            Ok(note) => note,
            Err(err) => {
                warn!("event=note_create module=repo status=read_back_failed note_id={id} error={err}");
                draft.into_note(id)
            }
        };
        info!("event=note_create module=repo status=ok note_id={id}");
        Ok(note)
    }

    /// Renames a note.
    ///
    /// # Errors
    /// - `InvalidInput` when `title` is blank; the store is not touched.
    /// - `NotFound` when no note has `id`.
    pub fn update_title(&self, id: NoteId, title: &str) -> NoteResult<()> {
        let title = normalize_title(title).map_err(|err| {
            warn!("event=note_update_title module=repo status=rejected note_id={id} reason=blank_title");
            NoteError::from(err)
        })?;
        self.apply_changes("note_update_title", id, &NoteChanges::title(title, now_ms()))
    }

    /// Replaces a note's document. The document is stored as given.
    pub fn update_content(&self, id: NoteId, document: Document) -> NoteResult<()> {
        self.apply_changes(
            "note_update_content",
            id,
            &NoteChanges::content(document, now_ms()),
        )
    }

    /// Deletes a note; deleting a missing note succeeds.
    pub fn delete_note(&self, id: NoteId) -> NoteResult<()> {
        match self.store.delete(id) {
            Ok(()) => {
                info!("event=note_delete module=repo status=ok note_id={id}");
                Ok(())
            }
            Err(err) => {
                error!("event=note_delete module=repo status=error note_id={id} error={err}");
                Err(NoteError::storage("failed to delete note", err))
            }
        }
    }

    /// Lists all notes, most recently updated first.
    pub fn list_notes(&self) -> NoteResult<Vec<Note>> {
        match self.store.list_all_ordered_by_recency() {
            Ok(notes) => {
                debug!("event=note_list module=repo status=ok count={}", notes.len());
                Ok(notes)
            }
            Err(err) => {
                error!("event=note_list module=repo status=error error={err}");
                Err(NoteError::storage("failed to load notes", err))
            }
        }
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> NoteResult<Note> {
        match self.store.get(id) {
            Ok(Some(note)) => Ok(note),
            Ok(None) => Err(NoteError::NotFound(id)),
            Err(err) => {
                error!("event=note_get module=repo status=error note_id={id} error={err}");
                Err(NoteError::storage("failed to load note", err))
            }
        }
    }

    fn read_back(&self, id: NoteId) -> StoreResult<Note> {
        self.store.get(id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("created note {id} not found in read-back"))
        })
    }

    fn apply_changes(&self, event: &str, id: NoteId, changes: &NoteChanges) -> NoteResult<()> {
        match self.store.update_fields(id, changes) {
            Ok(0) => {
                warn!("event={event} module=repo status=not_found note_id={id}");
                Err(NoteError::NotFound(id))
            }
            Ok(_) => {
                debug!("event={event} module=repo status=ok note_id={id}");
                Ok(())
            }
            Err(err) => {
                error!("event={event} module=repo status=error note_id={id} error={err}");
                Err(NoteError::storage("failed to update note", err))
            }
        }
    }
}
