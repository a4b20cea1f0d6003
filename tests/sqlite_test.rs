//! Integration tests for SQLite introspection and row preview.

use rusqlite::Connection;
use schema_canvas::introspect::{
    load_snapshot, preview_rows, SchemaSource, SourceKind, SqliteSource,
};
use schema_canvas::{build_graph, SchemaAccessError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_test_db(dir: &TempDir, file_name: &str, sql: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    drop(conn);
    path
}

fn notes_sql() -> &'static str {
    r#"
CREATE TABLE settings (
    key TEXT PRIMARY KEY,
    value TEXT
);

CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    theme TEXT REFERENCES settings(key)
);

CREATE TABLE notes (
    id INTEGER PRIMARY KEY,
    author_id INTEGER,
    body,
    FOREIGN KEY (author_id) REFERENCES users
);

INSERT INTO settings VALUES ('dark', '1');
INSERT INTO users VALUES (1, 'Alice', 'dark'), (2, 'Bob', NULL);
INSERT INTO notes VALUES (1, 1, 'hello'), (2, 2, x'00ff');
"#
}

#[test]
fn test_introspect_tables_in_creation_order() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "notes.sqlite", notes_sql());
    let source = SqliteSource::open(&path).unwrap();

    assert_eq!(source.table_names().unwrap(), vec!["settings", "users", "notes"]);
    assert_eq!(source.path(), Some(path.as_path()));
}

#[test]
fn test_introspect_columns_and_keys() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "notes.sqlite", notes_sql());
    let source = SqliteSource::open(&path).unwrap();

    let columns = source.columns("notes").unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "author_id", "body"]);
    assert!(columns[0].is_primary_key);
    assert_eq!(columns[0].declared_type, "INTEGER");
    assert_eq!(columns[2].declared_type, "");

    let fks = source.foreign_keys("users").unwrap();
    assert_eq!(fks.len(), 1);
    assert_eq!(
        (fks[0].from_column.as_str(), fks[0].to_table.as_str(), fks[0].to_column.as_str()),
        ("theme", "settings", "key")
    );

    // No column list: resolved against users' primary key at graph build
    let fks = source.foreign_keys("notes").unwrap();
    assert_eq!(fks.len(), 1);
    assert!(fks[0].targets_primary_key());
}

#[test]
fn test_build_graph_from_database() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "notes.sqlite3", notes_sql());
    let source = SqliteSource::open(&path).unwrap();

    let graph = build_graph(&source).unwrap();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert!(graph.warnings().is_empty());

    let to_users = graph
        .edges()
        .iter()
        .find(|e| e.source_table == "notes")
        .unwrap();
    assert_eq!(to_users.target_table, "users");
    assert_eq!(to_users.target_column_index, 0);
}

#[test]
fn test_db_extension_detected_by_header() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "app.db", notes_sql());

    assert_eq!(SourceKind::from_path(&path), SourceKind::Sqlite);
    let snapshot = load_snapshot(&path, None).unwrap();
    assert_eq!(snapshot.len(), 3);
}

#[test]
fn test_open_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = SqliteSource::open(&dir.path().join("nope.sqlite"));
    assert!(matches!(result, Err(SchemaAccessError::Open { .. })));
}

#[test]
fn test_open_garbage_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.sqlite");
    fs::write(&path, vec![b'x'; 4096]).unwrap();

    let result = SqliteSource::open(&path);
    assert!(matches!(result, Err(SchemaAccessError::Open { .. })));
}

#[test]
fn test_preview_rows() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "notes.sqlite", notes_sql());

    let preview = preview_rows(&path, None, "users", 10).unwrap();
    assert_eq!(preview.columns, vec!["id", "name", "theme"]);
    assert_eq!(preview.rows[0], vec!["1", "Alice", "dark"]);
    assert_eq!(preview.rows[1][2], "NULL");

    let notes = preview_rows(&path, Some(SourceKind::Sqlite), "notes", 1).unwrap();
    assert_eq!(notes.row_count(), 1);

    let blobs = preview_rows(&path, None, "notes", 5).unwrap();
    assert_eq!(blobs.rows[1][2], "<blob 2 bytes>");
}

#[test]
fn test_preview_unknown_table() {
    let dir = TempDir::new().unwrap();
    let path = create_test_db(&dir, "notes.sqlite", notes_sql());
    let source = SqliteSource::open(&path).unwrap();

    let result = source.preview_rows("users; DROP TABLE users", 5);
    assert!(matches!(result, Err(SchemaAccessError::Query { .. })));
    assert_eq!(source.table_names().unwrap().len(), 3);
}

#[test]
fn test_preview_rejects_script() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("schema.sql");
    fs::write(&path, "CREATE TABLE users (id INT PRIMARY KEY);").unwrap();

    let result = preview_rows(&path, None, "users", 5);
    assert!(matches!(result, Err(SchemaAccessError::Open { .. })));
}
