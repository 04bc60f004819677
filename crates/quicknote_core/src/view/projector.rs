//! Stale-while-revalidate projector over note list fetches.

use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::NoteResult;
use log::debug;

/// What the presentation layer should render for the notes list.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// First load, nothing to show yet.
    Fetching,
    /// Reloading while the previous list stays visible (dimmed).
    Refetching {
        notes: Vec<Note>,
        /// Error from the previous attempt, still shown while retrying.
        error: Option<String>,
    },
    Success {
        notes: Vec<Note>,
    },
    /// Last fetch failed. `notes` holds the last good list, possibly empty.
    Error {
        message: String,
        notes: Vec<Note>,
    },
}

impl ViewState {
    /// Notes currently visible, stale or fresh.
    pub fn notes(&self) -> &[Note] {
        match self {
            Self::Fetching => &[],
            Self::Refetching { notes, .. }
            | Self::Success { notes }
            | Self::Error { notes, .. } => notes,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            Self::Refetching { error, .. } => error.as_deref(),
            Self::Fetching | Self::Success { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Fetching | Self::Refetching { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Refetching { .. } => "refetching",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }
}

/// Handle identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// Notes list view: fetch state plus the selected note.
#[derive(Debug)]
pub struct NotesView {
    state: ViewState,
    generation: u64,
    selected: Option<NoteId>,
}

impl Default for NotesView {
    fn default() -> Self {
        Self::new()
    }
}

impl NotesView {
    /// Starts in `Fetching`, as on initial mount.
    pub fn new() -> Self {
        Self {
            state: ViewState::Fetching,
            generation: 0,
            selected: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn selected(&self) -> Option<NoteId> {
        self.selected
    }

    /// Selected note looked up in the visible list.
    pub fn selected_note(&self) -> Option<&Note> {
        let id = self.selected?;
        self.state.notes().iter().find(|note| note.id == id)
    }

    /// Explicit user selection. Validity is rechecked on the next settle.
    pub fn select(&mut self, id: NoteId) {
        self.selected = Some(id);
    }

    /// Whether a visible list is being revalidated.
    pub fn is_stale(&self) -> bool {
        matches!(self.state, ViewState::Refetching { .. })
    }

    /// Issues a new fetch, superseding any in flight.
    ///
    /// Enters `Refetching` when there is something to keep on screen,
    /// otherwise `Fetching`.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, ViewState::Fetching);
        self.state = match previous {
            ViewState::Success { notes } => ViewState::Refetching { notes, error: None },
            ViewState::Error { message, notes } if !notes.is_empty() => ViewState::Refetching {
                notes,
                error: Some(message),
            },
            ViewState::Refetching { notes, error } => ViewState::Refetching { notes, error },
            ViewState::Error { .. } | ViewState::Fetching => ViewState::Fetching,
        };
        debug!(
            "event=view_fetch module=view status=start generation={} state={}",
            self.generation,
            self.state.label()
        );
        FetchTicket(self.generation)
    }

    /// Marks the list out of date after a successful mutation.
    pub fn invalidate(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Settles the fetch identified by `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when a newer fetch has
    /// been issued since.
    pub fn complete(&mut self, ticket: FetchTicket, result: NoteResult<Vec<Note>>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                "event=view_fetch module=view status=superseded generation={} latest={}",
                ticket.0, self.generation
            );
            return false;
        }

        self.state = match result {
            Ok(notes) => {
                self.reconcile_selection(&notes);
                ViewState::Success { notes }
            }
            Err(err) => {
                let previous = std::mem::replace(&mut self.state, ViewState::Fetching);
                let notes = match previous {
                    ViewState::Fetching => Vec::new(),
                    ViewState::Refetching { notes, .. }
                    | ViewState::Success { notes }
                    | ViewState::Error { notes, .. } => notes,
                };
                ViewState::Error {
                    message: err.to_string(),
                    notes,
                }
            }
        };
        debug!(
            "event=view_fetch module=view status={} generation={}",
            self.state.label(),
            self.generation
        );
        true
    }

    fn reconcile_selection(&mut self, notes: &[Note]) {
        let still_listed = self
            .selected
            .is_some_and(|id| notes.iter().any(|note| note.id == id));
        if !still_listed {
            self.selected = notes.first().map(|note| note.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotesView, ViewState};
    use crate::model::note::{blank_document, Note};
    use crate::repo::note_repo::NoteError;
    use crate::store::StoreError;

    fn note(id: i64, updated: i64) -> Note {
        Note {
            id,
            title: format!("note {id}"),
            content: blank_document(),
            created_at: 0,
            last_updated_at: updated,
        }
    }

    fn storage_error() -> NoteError {
        NoteError::Storage {
            context: "failed to load notes",
            source: StoreError::InvalidData("disk unavailable".to_string()),
        }
    }

    #[test]
    fn initial_load_goes_from_fetching_to_success() {
        let mut view = NotesView::new();
        assert_eq!(view.state(), &ViewState::Fetching);

        let ticket = view.begin_fetch();
        assert_eq!(view.state(), &ViewState::Fetching);
        assert!(view.complete(ticket, Ok(vec![note(2, 20), note(1, 10)])));

        assert_eq!(view.state().notes().len(), 2);
        assert_eq!(view.selected(), Some(2));
        assert!(!view.state().is_loading());
    }

    #[test]
    fn refresh_keeps_previous_notes_visible() {
        let mut view = NotesView::new();
        let first = view.begin_fetch();
        view.complete(first, Ok(vec![note(1, 10)]));

        view.invalidate();
        assert!(view.is_stale());
        assert_eq!(
            view.state(),
            &ViewState::Refetching {
                notes: vec![note(1, 10)],
                error: None
            }
        );
    }

    #[test]
    fn refetch_failure_retains_stale_notes() {
        let mut view = NotesView::new();
        let first = view.begin_fetch();
        view.complete(first, Ok(vec![note(1, 10)]));

        let second = view.begin_fetch();
        view.complete(second, Err(storage_error()));

        match view.state() {
            ViewState::Error { message, notes } => {
                assert!(message.contains("failed to load notes"));
                assert_eq!(notes, &vec![note(1, 10)]);
            }
            other => panic!("unexpected state: {other:?}"),
        }

        view.begin_fetch();
        assert!(view.is_stale());
        assert!(view.state().error().is_some());
    }

    #[test]
    fn initial_failure_has_no_notes_and_retry_refetches_from_scratch() {
        let mut view = NotesView::new();
        let ticket = view.begin_fetch();
        view.complete(ticket, Err(storage_error()));
        assert!(view.state().notes().is_empty());
        assert!(view.state().error().is_some());

        view.begin_fetch();
        assert_eq!(view.state(), &ViewState::Fetching);
    }

    #[test]
    fn superseded_fetch_result_is_ignored() {
        let mut view = NotesView::new();
        let slow = view.begin_fetch();
        let fast = view.begin_fetch();

        assert!(view.complete(fast, Ok(vec![note(2, 20), note(1, 10)])));
        assert!(!view.complete(slow, Ok(vec![note(1, 10)])));

        assert_eq!(view.state().notes().len(), 2);
    }

    #[test]
    fn selection_resets_to_first_note_when_missing() {
        let mut view = NotesView::new();
        let ticket = view.begin_fetch();
        view.complete(ticket, Ok(vec![note(3, 30), note(2, 20)]));
        view.select(2);
        assert_eq!(view.selected_note().map(|n| n.id), Some(2));

        let ticket = view.invalidate();
        view.complete(ticket, Ok(vec![note(3, 30)]));
        assert_eq!(view.selected(), Some(3));

        let ticket = view.invalidate();
        view.complete(ticket, Ok(Vec::new()));
        assert_eq!(view.selected(), None);
    }

    #[test]
    fn valid_selection_survives_refresh() {
        let mut view = NotesView::new();
        let ticket = view.begin_fetch();
        view.complete(ticket, Ok(vec![note(3, 30), note(2, 20)]));
        view.select(2);

        let ticket = view.invalidate();
        view.complete(ticket, Ok(vec![note(2, 40), note(3, 30)]));
        assert_eq!(view.selected(), Some(2));
    }
}
