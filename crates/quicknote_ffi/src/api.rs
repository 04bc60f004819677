//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note repository contract to Dart via FRB.
//! - Flatten typed repository outcomes into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every failure is reported through `ok=false` plus a stable `kind`.
//! - Documents cross the boundary as JSON text.

use log::warn;
use quicknote_core::model::note::normalize_title;
use quicknote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_repository,
    ping as ping_inner, CoreConfig, Document, Note, NoteError, NoteId, NoteRepository,
    SqliteNoteStore,
};
use std::sync::OnceLock;

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Note as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    /// Editor document serialized as JSON.
    pub content_json: String,
    pub created_at: i64,
    pub last_updated_at: i64,
}

/// Response envelope for the notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Most recently updated first. Empty on failure.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Response envelope for a single note read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetailResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    /// `found|not_found|failed`.
    pub kind: String,
    pub message: String,
}

/// Response envelope for create/update/delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    pub ok: bool,
    /// `created|updated|deleted|invalid_input|not_found|failed`.
    pub kind: String,
    /// Id of the created note.
    pub note_id: Option<i64>,
    pub message: String,
}

impl NoteActionResponse {
    fn success(kind: &str, note_id: Option<NoteId>, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            kind: kind.to_string(),
            note_id,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: &NoteError) -> Self {
        Self {
            ok: false,
            kind: err.code().to_string(),
            note_id: None,
            message: format!("{operation} failed: {err}"),
        }
    }
}

/// Lists all notes, most recently updated first.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match with_repository(|repo| repo.list_notes()) {
        Ok(notes) => {
            let items = notes.iter().map(to_note_item).collect::<Vec<_>>();
            NotesListResponse {
                ok: true,
                message: format!("Loaded {} note(s).", items.len()),
                items,
            }
        }
        Err(err) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note; a missing or blank title gets the configured default.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(title: Option<String>) -> NoteActionResponse {
    match with_repository(|repo| repo.create_note(title.as_deref())) {
        Ok(note) => NoteActionResponse::success("created", Some(note.id), "Note created."),
        Err(err) => NoteActionResponse::failure("note_create", &err),
    }
}

/// Reads one note.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(note_id: i64) -> NoteDetailResponse {
    match with_repository(|repo| repo.get_note(note_id)) {
        Ok(note) => NoteDetailResponse {
            ok: true,
            note: Some(to_note_item(&note)),
            kind: "found".to_string(),
            message: String::new(),
        },
        Err(err) => NoteDetailResponse {
            ok: false,
            note: None,
            kind: err.code().to_string(),
            message: format!("note_get failed: {err}"),
        },
    }
}

/// Renames a note. Blank titles are rejected without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update_title(note_id: i64, title: String) -> NoteActionResponse {
    if let Err(err) = normalize_title(&title) {
        return NoteActionResponse::failure("note_update_title", &NoteError::from(err));
    }
    match with_repository(|repo| repo.update_title(note_id, title.as_str())) {
        Ok(()) => NoteActionResponse::success("updated", None, "Title updated."),
        Err(err) => NoteActionResponse::failure("note_update_title", &err),
    }
}

/// Replaces a note's document.
///
/// `content_json` must be valid JSON; its shape is not inspected.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update_content(note_id: i64, content_json: String) -> NoteActionResponse {
    let document = match serde_json::from_str::<Document>(&content_json) {
        Ok(document) => document,
        Err(err) => {
            warn!("event=ffi_decode module=ffi status=rejected note_id={note_id} error={err}");
            let err = NoteError::InvalidInput(format!("content is not valid JSON: {err}"));
            return NoteActionResponse::failure("note_update_content", &err);
        }
    };
    match with_repository(|repo| repo.update_content(note_id, document)) {
        Ok(()) => NoteActionResponse::success("updated", None, "Note saved."),
        Err(err) => NoteActionResponse::failure("note_update_content", &err),
    }
}

/// Deletes a note. Deleting an already missing note still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(note_id: i64) -> NoteActionResponse {
    match with_repository(|repo| repo.delete_note(note_id)) {
        Ok(()) => NoteActionResponse::success("deleted", None, "Note deleted."),
        Err(err) => NoteActionResponse::failure("note_delete", &err),
    }
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(CoreConfig::from_env)
}

fn with_repository<T>(
    f: impl FnOnce(&NoteRepository<SqliteNoteStore>) -> Result<T, NoteError>,
) -> Result<T, NoteError> {
    let repo = open_repository(config()).map_err(|source| NoteError::Storage {
        context: "failed to open note store",
        source,
    })?;
    f(&repo)
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id,
        title: note.title.clone(),
        content_json: note.content.to_string(),
        created_at: note.created_at,
        last_updated_at: note.last_updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create, note_delete, note_get, note_update_content,
        note_update_title, notes_list, ping,
    };
    use std::sync::Once;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_DB: Once = Once::new();

    fn use_temp_db() {
        TEST_DB.call_once(|| {
            let path = std::env::temp_dir().join(format!(
                "quicknote-ffi-{}-{}.sqlite3",
                std::process::id(),
                unique_suffix()
            ));
            std::env::set_var(quicknote_core::config::DB_PATH_ENV, path);
        });
    }

    fn unique_suffix() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos()
    }

    fn unique_title(prefix: &str) -> String {
        format!("{prefix}-{}", unique_suffix())
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_invalid_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn created_note_is_listed_first_with_trimmed_title() {
        use_temp_db();
        let title = unique_title("ffi-create");
        let created = note_create(Some(format!("  {title}  ")));
        assert!(created.ok, "{}", created.message);
        assert_eq!(created.kind, "created");
        let note_id = created.note_id.expect("created note should return id");

        let detail = note_get(note_id);
        assert!(detail.ok, "{}", detail.message);
        assert_eq!(detail.note.expect("note").title, title);

        let listed = notes_list();
        assert!(listed.ok, "{}", listed.message);
        assert!(listed.items.iter().any(|item| item.id == note_id));
    }

    #[test]
    fn title_and_content_updates_report_outcome_kinds() {
        use_temp_db();
        let created = note_create(Some(unique_title("ffi-update")));
        let note_id = created.note_id.expect("created note should return id");

        let blank = note_update_title(note_id, "   ".to_string());
        assert!(!blank.ok);
        assert_eq!(blank.kind, "invalid_input");

        let renamed = note_update_title(note_id, "renamed".to_string());
        assert!(renamed.ok, "{}", renamed.message);

        let saved = note_update_content(note_id, r#"{"type":"doc","content":[]}"#.to_string());
        assert!(saved.ok, "{}", saved.message);
        let detail = note_get(note_id).note.expect("note");
        let stored: serde_json::Value = serde_json::from_str(&detail.content_json).unwrap();
        assert_eq!(stored, serde_json::json!({"type": "doc", "content": []}));

        let garbage = note_update_content(note_id, "{not json".to_string());
        assert_eq!(garbage.kind, "invalid_input");

        let missing = note_update_title(i64::MAX, "x".to_string());
        assert_eq!(missing.kind, "not_found");
    }

    #[test]
    fn delete_is_idempotent_across_ffi() {
        use_temp_db();
        let created = note_create(None);
        let note_id = created.note_id.expect("created note should return id");

        assert!(note_delete(note_id).ok);
        let again = note_delete(note_id);
        assert!(again.ok);
        assert_eq!(again.kind, "deleted");
        assert_eq!(note_get(note_id).kind, "not_found");
    }
}
