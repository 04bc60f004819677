//! Note record, draft and partial-update shapes.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `last_updated_at >= created_at`.
//! - A persisted `title` is never empty after trimming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned note identifier.
pub type NoteId = i64;

/// Opaque rich-text document tree as produced by the editor surface.
pub type Document = Value;

/// Fixed default title used when a note is created without one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Persisted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Editor document, never inspected by core.
    pub content: Document,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Sort key for listing.
    pub last_updated_at: i64,
}

/// Note that has not been persisted yet and therefore has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteDraft {
    pub title: String,
    pub content: Document,
    pub created_at: i64,
    pub last_updated_at: i64,
}

impl NoteDraft {
    /// Builds a draft with a blank document, stamped at `now_ms`.
    pub fn blank(title: impl Into<String>, now_ms: i64) -> Self {
        Self {
            title: title.into(),
            content: blank_document(),
            created_at: now_ms,
            last_updated_at: now_ms,
        }
    }

    /// The note this draft became once stored under `id`.
    pub fn into_note(self, id: NoteId) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
            last_updated_at: self.last_updated_at,
        }
    }
}

/// Partial update applied by the store.
///
/// Fields left as `None` are not written, so title and content edits issued
/// independently never overwrite each other.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<Document>,
    /// Candidate `last_updated_at`; the store keeps the value strictly
    /// increasing even when this is not ahead of the current one.
    pub touched_at: i64,
}

impl NoteChanges {
    pub fn title(title: impl Into<String>, touched_at: i64) -> Self {
        Self {
            title: Some(title.into()),
            content: None,
            touched_at,
        }
    }

    pub fn content(content: Document, touched_at: i64) -> Self {
        Self {
            title: None,
            content: Some(content),
            touched_at,
        }
    }
}

/// How a note gets its title when none is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultTitle {
    /// Always the same string.
    Fixed(String),
    /// Creation date, e.g. `Oct 18, 2026`.
    DateDerived,
}

impl Default for DefaultTitle {
    fn default() -> Self {
        Self::Fixed(DEFAULT_NOTE_TITLE.to_string())
    }
}

impl DefaultTitle {
    /// Produces the default title for a note created at `now_ms`.
    pub fn resolve(&self, now_ms: i64) -> String {
        match self {
            Self::Fixed(title) => match title.trim() {
                "" => DEFAULT_NOTE_TITLE.to_string(),
                trimmed => trimmed.to_string(),
            },
            Self::DateDerived => DateTime::<Utc>::from_timestamp_millis(now_ms)
                .map(|at| at.format("%b %-d, %Y").to_string())
                .unwrap_or_else(|| DEFAULT_NOTE_TITLE.to_string()),
        }
    }
}

/// Title rejected at the update boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleValidationError;

impl Display for TitleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "title should have at least one non-whitespace character"
        )
    }
}

impl Error for TitleValidationError {}

/// Trims `title`, rejecting whitespace-only input.
pub fn normalize_title(title: &str) -> Result<String, TitleValidationError> {
    match title.trim() {
        "" => Err(TitleValidationError),
        trimmed => Ok(trimmed.to_string()),
    }
}

/// Document every new note starts with: one empty paragraph.
pub fn blank_document() -> Document {
    json!({
        "type": "doc",
        "content": [
            { "type": "paragraph" }
        ]
    })
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{blank_document, normalize_title, DefaultTitle, NoteDraft, DEFAULT_NOTE_TITLE};

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Shopping \n").unwrap(), "Shopping");
        assert!(normalize_title(" \t ").is_err());
        assert!(normalize_title("").is_err());
    }

    #[test]
    fn fixed_default_title_falls_back_when_blank() {
        assert_eq!(DefaultTitle::default().resolve(0), DEFAULT_NOTE_TITLE);
        assert_eq!(
            DefaultTitle::Fixed("  ".to_string()).resolve(0),
            DEFAULT_NOTE_TITLE
        );
        assert_eq!(DefaultTitle::Fixed(" Inbox ".to_string()).resolve(0), "Inbox");
    }

    #[test]
    fn date_derived_title_formats_creation_day() {
        // 2026-10-18T12:00:00Z
        let title = DefaultTitle::DateDerived.resolve(1_792_324_800_000);
        assert_eq!(title, "Oct 18, 2026");
    }

    #[test]
    fn blank_draft_has_matching_timestamps_and_paragraph() {
        let draft = NoteDraft::blank("x", 42);
        assert_eq!(draft.created_at, 42);
        assert_eq!(draft.last_updated_at, 42);
        assert_eq!(draft.content, blank_document());
        assert_eq!(draft.content["content"][0]["type"], "paragraph");
    }
}
