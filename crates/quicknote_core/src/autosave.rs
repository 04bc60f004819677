//! Debounced autosave for editor content.
//!
//! # Responsibility
//! - Coalesce rapid document edits into one pending write per quiet period.
//!
//! # Invariants
//! - At most one edit is pending; each new edit for the same note replaces
//!   it and pushes the deadline back.
//! - An edit for another note never silently replaces the pending one; the
//!   older edit is handed back to be written immediately.
//! - An edit whose write failed is held per note until it is written, a
//!   newer edit for the same note supersedes it, or the note is discarded.
//! - The buffer never reads a clock itself; callers pass `now`.

use crate::model::note::{Document, NoteId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Default quiet period before a pending edit is written.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(750);

/// Document waiting to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub note_id: NoteId,
    pub document: Document,
}

#[derive(Debug)]
struct Pending {
    edit: PendingEdit,
    deadline: Instant,
}

/// Timer-and-pending-value cell plus failed writes awaiting retry.
#[derive(Debug)]
pub struct AutosaveBuffer {
    delay: Duration,
    pending: Option<Pending>,
    retry: BTreeMap<NoteId, PendingEdit>,
}

impl Default for AutosaveBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl AutosaveBuffer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            retry: BTreeMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records an edit and restarts the quiet period.
    ///
    /// Returns the previously pending edit when it belongs to a different
    /// note; the caller must persist it right away.
    pub fn record(
        &mut self,
        note_id: NoteId,
        document: Document,
        now: Instant,
    ) -> Option<PendingEdit> {
        let evicted = match self.pending.take() {
            Some(previous) if previous.edit.note_id != note_id => Some(previous.edit),
            _ => None,
        };
        self.retry.remove(&note_id);
        self.pending = Some(Pending {
            edit: PendingEdit { note_id, document },
            deadline: now + self.delay,
        });
        evicted
    }

    /// Takes the pending edit once its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<PendingEdit> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.deadline <= now);
        if due {
            self.take_pending()
        } else {
            None
        }
    }

    /// Takes the pending edit regardless of its deadline.
    pub fn take_pending(&mut self) -> Option<PendingEdit> {
        self.pending.take().map(|pending| pending.edit)
    }

    /// Holds an edit whose write failed until the next retry.
    ///
    /// Returns `false` when a newer edit for the same note is already
    /// pending, which supersedes the failed one.
    pub fn requeue(&mut self, edit: PendingEdit) -> bool {
        if self.pending_note() == Some(edit.note_id) {
            return false;
        }
        self.retry.entry(edit.note_id).or_insert(edit);
        true
    }

    /// Takes every edit awaiting retry, lowest note id first.
    pub fn take_retries(&mut self) -> Vec<PendingEdit> {
        std::mem::take(&mut self.retry).into_values().collect()
    }

    /// Drops every held edit for `note_id`.
    pub fn discard(&mut self, note_id: NoteId) -> bool {
        let mut dropped = self.retry.remove(&note_id).is_some();
        if self.pending_note() == Some(note_id) {
            self.pending = None;
            dropped = true;
        }
        dropped
    }

    /// Whether any edit for `note_id` is still unwritten.
    pub fn holds(&self, note_id: NoteId) -> bool {
        self.pending_note() == Some(note_id) || self.retry.contains_key(&note_id)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    pub fn pending_note(&self) -> Option<NoteId> {
        self.pending.as_ref().map(|pending| pending.edit.note_id)
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none() && self.retry.is_empty()
    }
}
