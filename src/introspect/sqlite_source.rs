//! SQLite catalog introspection and read-only row preview.

use super::{RowPreview, SchemaSource};
use crate::error::SchemaAccessError;
use crate::schema::{ColumnRecord, ForeignKeyRecord};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// First bytes of every SQLite 3 database file
pub(crate) const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

const TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
     ORDER BY rowid";

const COLUMNS_SQL: &str = "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid";

// SQLite numbers foreign keys from the last declared one
const FOREIGN_KEY_SQL: &str = "SELECT \"from\", \"table\", \"to\" \
     FROM pragma_foreign_key_list(?1) ORDER BY id DESC, seq";

/// Schema source backed by a SQLite connection
pub struct SqliteSource {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteSource {
    /// Open a database file read-only.
    ///
    /// SQLite opens lazily, so the catalog is read once here to turn a
    /// non-database file into an [`SchemaAccessError::Open`] up front.
    pub fn open(path: &Path) -> Result<Self, SchemaAccessError> {
        if !path.exists() {
            return Err(SchemaAccessError::Open {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| open_error(path, e))?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| open_error(path, e))?;

        debug!(path = %path.display(), "opened sqlite store read-only");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wrap an existing connection (e.g. an in-memory database)
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn, path: None }
    }

    /// Path of the underlying database file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Fetch up to `limit` rows of `table` for display.
    ///
    /// The table name is checked against the catalog before it is spliced
    /// into the query.
    pub fn preview_rows(&self, table: &str, limit: usize) -> Result<RowPreview, SchemaAccessError> {
        let name = self
            .table_names()?
            .into_iter()
            .find(|t| t == table || t.eq_ignore_ascii_case(table))
            .ok_or_else(|| SchemaAccessError::query(table, "unknown table"))?;

        let sql = format!("SELECT * FROM {} LIMIT {}", quote_identifier(&name), limit);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| SchemaAccessError::query(&name, e))?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(format_value))
                    .collect::<Result<Vec<String>, _>>()
            })
            .map_err(|e| SchemaAccessError::query(&name, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaAccessError::query(&name, e))?;

        Ok(RowPreview { columns, rows })
    }
}

impl SchemaSource for SqliteSource {
    fn table_names(&self) -> Result<Vec<String>, SchemaAccessError> {
        let mut stmt = self
            .conn
            .prepare(TABLES_SQL)
            .map_err(|e| SchemaAccessError::query("catalog", e))?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| SchemaAccessError::query("catalog", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaAccessError::query("catalog", e))?;

        Ok(names)
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnRecord>, SchemaAccessError> {
        let mut stmt = self
            .conn
            .prepare(COLUMNS_SQL)
            .map_err(|e| SchemaAccessError::query(table, e))?;

        let columns = stmt
            .query_map(params![table], |row| {
                Ok(ColumnRecord {
                    name: row.get(0)?,
                    declared_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    // pk is the 1-based position within the primary key, 0 otherwise
                    is_primary_key: row.get::<_, i64>(2)? > 0,
                })
            })
            .map_err(|e| SchemaAccessError::query(table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaAccessError::query(table, e))?;

        Ok(columns)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRecord>, SchemaAccessError> {
        let mut stmt = self
            .conn
            .prepare(FOREIGN_KEY_SQL)
            .map_err(|e| SchemaAccessError::query(table, e))?;

        let fks = stmt
            .query_map(params![table], |row| {
                let from: String = row.get(0)?;
                let to_table: String = row.get(1)?;
                // NULL when the declaration names no column
                let to_column: Option<String> = row.get(2)?;
                Ok(match to_column {
                    Some(column) => ForeignKeyRecord::new(from, to_table, column),
                    None => ForeignKeyRecord::to_primary_key(from, to_table),
                })
            })
            .map_err(|e| SchemaAccessError::query(table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaAccessError::query(table, e))?;

        Ok(fks)
    }
}

fn open_error(path: &Path, err: rusqlite::Error) -> SchemaAccessError {
    let reason = err.to_string();
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked) => {
            SchemaAccessError::Locked {
                path: path.to_path_buf(),
                reason,
            }
        }
        _ => SchemaAccessError::Open {
            path: path.to_path_buf(),
            reason,
        },
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(s) => String::from_utf8_lossy(s).to_string(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}
