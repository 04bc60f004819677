use quicknote_core::db::open_db_in_memory;
use quicknote_core::{NoteChanges, NoteDraft, NoteStore, SqliteNoteStore, StoreError};
use rusqlite::Connection;
use serde_json::json;

#[test]
fn add_assigns_fresh_ids_and_get_reads_back() {
    let store = SqliteNoteStore::open_in_memory().unwrap();

    let first = store.add(&NoteDraft::blank("first", 100)).unwrap();
    let second = store.add(&NoteDraft::blank("second", 100)).unwrap();
    assert_ne!(first, second);

    let loaded = store.get(first).unwrap().unwrap();
    assert_eq!(loaded.title, "first");
    assert_eq!(loaded.created_at, 100);
    assert_eq!(loaded.last_updated_at, 100);
    assert_eq!(loaded.content["type"], "doc");
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let first = store.add(&NoteDraft::blank("gone", 1)).unwrap();
    store.delete(first).unwrap();

    let next = store.add(&NoteDraft::blank("new", 2)).unwrap();
    assert!(next > first);
}

#[test]
fn update_fields_only_writes_given_fields() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let id = store.add(&NoteDraft::blank("title", 10)).unwrap();

    let affected = store
        .update_fields(id, &NoteChanges::content(json!({"type": "doc", "v": 1}), 20))
        .unwrap();
    assert_eq!(affected, 1);
    let affected = store
        .update_fields(id, &NoteChanges::title("renamed", 30))
        .unwrap();
    assert_eq!(affected, 1);

    let loaded = store.get(id).unwrap().unwrap();
    assert_eq!(loaded.title, "renamed");
    assert_eq!(loaded.content, json!({"type": "doc", "v": 1}));
    assert_eq!(loaded.created_at, 10);
    assert_eq!(loaded.last_updated_at, 30);
}

#[test]
fn update_fields_never_moves_timestamp_backwards() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let id = store.add(&NoteDraft::blank("title", 500)).unwrap();

    store
        .update_fields(id, &NoteChanges::title("same instant", 500))
        .unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().last_updated_at, 501);

    store
        .update_fields(id, &NoteChanges::title("clock skew", 100))
        .unwrap();
    assert_eq!(store.get(id).unwrap().unwrap().last_updated_at, 502);
}

#[test]
fn update_fields_on_missing_record_affects_nothing() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let affected = store
        .update_fields(42, &NoteChanges::title("ghost", 1))
        .unwrap();
    assert_eq!(affected, 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn delete_is_idempotent() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let id = store.add(&NoteDraft::blank("x", 1)).unwrap();

    store.delete(id).unwrap();
    store.delete(id).unwrap();
    assert!(store.get(id).unwrap().is_none());
}

#[test]
fn listing_is_ordered_by_recency_and_writes_move_to_front() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    let old = store.add(&NoteDraft::blank("old", 10)).unwrap();
    let tie_a = store.add(&NoteDraft::blank("same tick a", 20)).unwrap();
    let tie_b = store.add(&NoteDraft::blank("same tick b", 20)).unwrap();

    let ids: Vec<_> = store
        .list_all_ordered_by_recency()
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(ids, vec![tie_b, tie_a, old]);
    let stamps: Vec<_> = store
        .list_all_ordered_by_recency()
        .unwrap()
        .into_iter()
        .map(|note| note.last_updated_at)
        .collect();
    assert_eq!(stamps, vec![21, 20, 10]);

    store
        .update_fields(old, &NoteChanges::title("touched", 15))
        .unwrap();
    let first = store.list_all_ordered_by_recency().unwrap()[0].id;
    assert_eq!(first, old);
}

#[test]
fn add_rejects_invalid_drafts_before_writing() {
    let store = SqliteNoteStore::open_in_memory().unwrap();

    let blank = store.add(&NoteDraft::blank("  ", 1)).unwrap_err();
    assert!(matches!(blank, StoreError::InvalidData(_)));

    let mut reversed = NoteDraft::blank("x", 10);
    reversed.last_updated_at = 5;
    assert!(matches!(
        store.add(&reversed).unwrap_err(),
        StoreError::InvalidData(_)
    ));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn corrupt_content_is_reported_not_masked() {
    let store = SqliteNoteStore::open_in_memory().unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO notes (title, content, created_at, last_updated_at)
             VALUES ('broken', 'not json', 1, 1);",
            [],
        )
        .unwrap();

    let err = store.list_all_ordered_by_recency().unwrap_err();
    assert!(matches!(err, StoreError::Codec(_)));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    match SqliteNoteStore::try_new(conn) {
        Err(StoreError::MissingRequiredTable(table)) => assert_eq!(table, "notes"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unmigrated connection must be rejected"),
    }
}

#[test]
fn file_store_survives_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let store = SqliteNoteStore::open(&path).unwrap();
    let id = store.add(&NoteDraft::blank("durable", 7)).unwrap();
    store.close().unwrap();

    let reopened = SqliteNoteStore::open(&path).unwrap();
    assert_eq!(reopened.get(id).unwrap().unwrap().title, "durable");
}

#[test]
fn store_can_be_used_through_a_reference() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteNoteStore::try_new(conn).unwrap();
    let by_ref: &SqliteNoteStore = &store;

    let id = NoteStore::add(&by_ref, &NoteDraft::blank("ref", 1)).unwrap();
    assert!(store.get(id).unwrap().is_some());
}
