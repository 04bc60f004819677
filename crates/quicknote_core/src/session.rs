//! Note session driven by a presentation host.
//!
//! # Responsibility
//! - Wire repository calls, view-state projection and autosave together.
//! - Refresh the notes list after every successful mutation.
//!
//! # Invariants
//! - A failed mutation leaves the view untouched and is returned to the
//!   caller.
//! - A content edit stays buffered until it is written, superseded by a
//!   newer edit for the same note, or its note is gone. A failed write
//!   returns the error and keeps the edit for the next tick or flush.

use crate::autosave::{AutosaveBuffer, PendingEdit};
use crate::model::note::{Document, Note, NoteId};
use crate::repo::note_repo::{NoteError, NoteRepository, NoteResult};
use crate::store::NoteStore;
use crate::view::{NotesView, ViewState};
use log::{info, warn};
use std::time::Instant;

/// One open notes screen: repository, list view and autosave buffer.
pub struct NoteSession<S: NoteStore> {
    repo: NoteRepository<S>,
    view: NotesView,
    autosave: AutosaveBuffer,
}

impl<S: NoteStore> NoteSession<S> {
    pub fn new(repo: NoteRepository<S>, autosave: AutosaveBuffer) -> Self {
        Self {
            repo,
            view: NotesView::new(),
            autosave,
        }
    }

    pub fn repository(&self) -> &NoteRepository<S> {
        &self.repo
    }

    pub fn view(&self) -> &NotesView {
        &self.view
    }

    pub fn state(&self) -> &ViewState {
        self.view.state()
    }

    pub fn autosave(&self) -> &AutosaveBuffer {
        &self.autosave
    }

    pub fn select(&mut self, id: NoteId) {
        self.view.select(id);
    }

    /// Loads or reloads the notes list and settles the view.
    pub fn refresh(&mut self) -> &ViewState {
        let ticket = self.view.begin_fetch();
        let result = self.repo.list_notes();
        self.view.complete(ticket, result);
        self.view.state()
    }

    /// Creates a note, selects it and refreshes the list.
    pub fn create_note(&mut self, title: Option<&str>) -> NoteResult<Note> {
        let note = self.repo.create_note(title)?;
        self.view.select(note.id);
        self.refresh();
        Ok(note)
    }

    pub fn rename_note(&mut self, id: NoteId, title: &str) -> NoteResult<()> {
        self.repo.update_title(id, title)?;
        self.refresh();
        Ok(())
    }

    /// Deletes a note along with any edit still waiting for it.
    ///
    /// The buffered edit is only dropped once the delete has succeeded.
    pub fn delete_note(&mut self, id: NoteId) -> NoteResult<()> {
        self.repo.delete_note(id)?;
        if self.autosave.discard(id) {
            info!("event=autosave_discard module=session status=ok note_id={id}");
        }
        self.refresh();
        Ok(())
    }

    /// Buffers an editor change for `id`.
    ///
    /// If an edit for a different note was pending it is written now, and
    /// its outcome is returned.
    pub fn edit_content(
        &mut self,
        id: NoteId,
        document: Document,
        now: Instant,
    ) -> NoteResult<()> {
        match self.autosave.record(id, document, now) {
            Some(evicted) => self.write_edit(evicted),
            None => Ok(()),
        }
    }

    /// Retries failed writes, then writes the pending edit once its quiet
    /// period has elapsed.
    ///
    /// Returns `Ok(true)` when something was written.
    pub fn tick(&mut self, now: Instant) -> NoteResult<bool> {
        let mut edits = self.autosave.take_retries();
        edits.extend(self.autosave.take_due(now));
        self.write_all(edits)
    }

    /// Writes every buffered edit immediately, e.g. before the host exits.
    pub fn flush(&mut self) -> NoteResult<bool> {
        let mut edits = self.autosave.take_retries();
        edits.extend(self.autosave.take_pending());
        self.write_all(edits)
    }

    /// Flushes pending work and releases the repository.
    pub fn shutdown(mut self) -> (NoteRepository<S>, NoteResult<()>) {
        let result = self.flush().map(|_| ());
        info!(
            "event=session_shutdown module=session status={}",
            if result.is_ok() { "ok" } else { "error" }
        );
        (self.repo, result)
    }

    /// Attempts every edit; the first failure is returned after the rest ran.
    fn write_all(&mut self, edits: Vec<PendingEdit>) -> NoteResult<bool> {
        let mut wrote = false;
        let mut first_err = None;
        for edit in edits {
            match self.write_edit(edit) {
                Ok(()) => wrote = true,
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(wrote),
        }
    }

    fn write_edit(&mut self, edit: PendingEdit) -> NoteResult<()> {
        let note_id = edit.note_id;
        match self.repo.update_content(note_id, edit.document.clone()) {
            Ok(()) => {
                self.refresh();
                Ok(())
            }
            Err(NoteError::NotFound(id)) => {
                warn!(
                    "event=autosave_flush module=session status=dropped note_id={id} reason=not_found"
                );
                Err(NoteError::NotFound(id))
            }
            Err(err) => {
                let held = self.autosave.requeue(edit);
                warn!(
                    "event=autosave_flush module=session status=error note_id={note_id} held={held}"
                );
                Err(err)
            }
        }
    }
}
