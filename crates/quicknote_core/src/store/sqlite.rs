//! SQLite-backed note store.
//!
//! # Invariants
//! - The connection is migrated before any note is read or written.
//! - Recency stamps are unique across the table: every insert or update
//!   stamps `max(requested, newest stamp + 1)`, so the record just written
//!   always sorts first and its own stamp only moves forward.
//! - Read paths reject undecodable content instead of masking it.

use super::{NoteStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{Note, NoteChanges, NoteDraft, NoteId};
use log::{error, info};
use rusqlite::{params, Connection, Row};
use std::path::Path;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    created_at,
    last_updated_at
FROM notes";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "content", "created_at", "last_updated_at"];

/// Note store owning one SQLite connection for its whole lifetime.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Opens (creating if needed) and migrates the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a fresh, empty in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the notes schema.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_notes_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for diagnostics and maintenance.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, surfacing any error the engine reports.
    pub fn close(self) -> StoreResult<()> {
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close module=store status=ok");
                Ok(())
            }
            Err((_, err)) => {
                error!("event=store_close module=store status=error error={err}");
                Err(err.into())
            }
        }
    }
}

impl NoteStore for SqliteNoteStore {
    fn add(&self, draft: &NoteDraft) -> StoreResult<NoteId> {
        validate_draft(draft)?;
        let content = serde_json::to_string(&draft.content)?;
        self.conn.execute(
            "INSERT INTO notes (
                title,
                content,
                created_at,
                last_updated_at
            ) VALUES (
                ?1,
                ?2,
                ?3,
                MAX(?4, (SELECT COALESCE(MAX(last_updated_at) + 1, ?4) FROM notes))
            );",
            params![
                draft.title,
                content,
                draft.created_at,
                draft.last_updated_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_fields(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<usize> {
        let content = changes
            .content
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = COALESCE(?2, title),
                content = COALESCE(?3, content),
                last_updated_at = MAX(?4, (SELECT MAX(last_updated_at) + 1 FROM notes))
             WHERE id = ?1;",
            params![id, changes.title, content, changes.touched_at],
        )?;
        Ok(changed)
    }

    fn delete(&self, id: NoteId) -> StoreResult<()> {
        self.conn.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn list_all_ordered_by_recency(&self) -> StoreResult<Vec<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} ORDER BY last_updated_at DESC, id DESC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} WHERE id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative note count {count}")))
    }
}

fn validate_draft(draft: &NoteDraft) -> StoreResult<()> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::InvalidData(
            "note title must not be blank".to_string(),
        ));
    }
    if draft.last_updated_at < draft.created_at {
        return Err(StoreError::InvalidData(format!(
            "last_updated_at {} precedes created_at {}",
            draft.last_updated_at, draft.created_at
        )));
    }
    Ok(())
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let id: NoteId = row.get("id")?;
    let raw_content: String = row.get("content")?;
    let content = serde_json::from_str(&raw_content).map_err(|err| {
        error!("event=note_decode module=store status=error note_id={id} error={err}");
        StoreError::Codec(err)
    })?;

    Ok(Note {
        id,
        title: row.get("title")?,
        content,
        created_at: row.get("created_at")?,
        last_updated_at: row.get("last_updated_at")?,
    })
}

fn ensure_notes_schema(conn: &Connection) -> StoreResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(StoreError::MissingRequiredTable("notes"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "notes", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
