//! Client-visible fetch state for the notes list.
//!
//! # Responsibility
//! - Project repository list results into a finite view state.
//! - Own the "selected note" policy that depends on list ordering.
//!
//! # Invariants
//! - Only the most recently issued fetch may settle the state.
//! - A failed refresh never discards the last successfully loaded notes.

mod projector;

pub use projector::{FetchTicket, NotesView, ViewState};
