use notemap_core::db::migrations::{apply_migrations, latest_version, schema_version};
use notemap_core::db::{ensure_schema_ready, open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    for table in ["notes", "note_types", "note_supertypes", "note_contents"] {
        assert_table_exists(&conn, table);
    }
    ensure_schema_ready(&conn).unwrap();
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notemap.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let mut conn_second = open_db(&path).unwrap();
    assert_eq!(apply_migrations(&mut conn_second).unwrap(), 0);
    assert_table_exists(&conn_second, "notes");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unmigrated_connection_is_not_ready() {
    let conn = Connection::open_in_memory().unwrap();
    let err = ensure_schema_ready(&conn).unwrap_err();
    assert!(matches!(
        err,
        DbError::SchemaNotReady {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn notes_reject_the_unassigned_id() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute("INSERT INTO notes (id) VALUES (0);", []);
    assert!(result.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
