//! Core domain logic for quicknote.
//! This crate is the single source of truth for note invariants.

pub mod autosave;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod session;
pub mod store;
pub mod view;

pub use autosave::{AutosaveBuffer, PendingEdit, DEFAULT_AUTOSAVE_DELAY};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    blank_document, DefaultTitle, Document, Note, NoteChanges, NoteDraft, NoteId,
    DEFAULT_NOTE_TITLE,
};
pub use repo::note_repo::{NoteError, NoteRepository, NoteResult};
pub use session::NoteSession;
pub use store::{NoteStore, SqliteNoteStore, StoreError, StoreResult};
pub use view::{FetchTicket, NotesView, ViewState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Opens the configured store and wraps it in a repository.
pub fn open_repository(config: &CoreConfig) -> StoreResult<NoteRepository<SqliteNoteStore>> {
    let store = SqliteNoteStore::open(&config.db_path)?;
    Ok(NoteRepository::with_default_title(
        store,
        config.default_title.clone(),
    ))
}
