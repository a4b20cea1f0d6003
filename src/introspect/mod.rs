//! Schema introspection against relational stores.
//!
//! A [`SchemaSource`] answers three questions per store: which tables exist,
//! what columns each has, and which foreign keys each declares. [`introspect`]
//! walks a source once and produces an immutable [`SchemaSnapshot`].
//!
//! Three stores are supported:
//! - **DuckDB** database files, opened read-only ([`DuckDbSource`])
//! - **SQLite** database files, opened read-only ([`SqliteSource`])
//! - **SQL scripts** of `CREATE TABLE` / `ALTER TABLE` statements ([`load_script`])

mod duckdb_source;
mod sqlite_source;

pub use duckdb_source::DuckDbSource;
pub use sqlite_source::SqliteSource;

use crate::error::SchemaAccessError;
use crate::schema::{
    parse_script, ColumnRecord, ForeignKeyRecord, SchemaSnapshot, TableRecord,
};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// First rows of one table, rendered for display
#[derive(Debug, Clone)]
pub struct RowPreview {
    /// Column names
    pub columns: Vec<String>,
    /// Rows of data (each row is a vector of display strings)
    pub rows: Vec<Vec<String>>,
}

impl RowPreview {
    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the preview is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only view of a relational store's catalog
pub trait SchemaSource {
    /// Table names in a stable order (creation/declaration order)
    fn table_names(&self) -> Result<Vec<String>, SchemaAccessError>;

    /// Ordered column descriptors of one table
    fn columns(&self, table: &str) -> Result<Vec<ColumnRecord>, SchemaAccessError>;

    /// Declared foreign keys of one table, one record per column pair
    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRecord>, SchemaAccessError>;
}

/// Walk a source and collect a complete snapshot.
///
/// The first failing query aborts the whole pass.
pub fn introspect<S: SchemaSource + ?Sized>(
    source: &S,
) -> Result<SchemaSnapshot, SchemaAccessError> {
    let mut snapshot = SchemaSnapshot::new();

    for name in source.table_names()? {
        let columns = source.columns(&name)?;
        let foreign_keys = source.foreign_keys(&name)?;
        debug!(
            table = %name,
            columns = columns.len(),
            foreign_keys = foreign_keys.len(),
            "introspected table"
        );
        snapshot.add_table(TableRecord {
            name,
            columns,
            foreign_keys,
        });
    }

    Ok(snapshot)
}

impl SchemaSource for SchemaSnapshot {
    fn table_names(&self) -> Result<Vec<String>, SchemaAccessError> {
        Ok(self.iter().map(|t| t.name.clone()).collect())
    }

    fn columns(&self, table: &str) -> Result<Vec<ColumnRecord>, SchemaAccessError> {
        self.get_table(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| SchemaAccessError::query(table, "unknown table"))
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRecord>, SchemaAccessError> {
        self.get_table(table)
            .map(|t| t.foreign_keys.clone())
            .ok_or_else(|| SchemaAccessError::query(table, "unknown table"))
    }
}

/// Read and parse a SQL schema script
pub fn load_script(path: &Path) -> Result<SchemaSnapshot, SchemaAccessError> {
    let sql = fs::read_to_string(path).map_err(|source| SchemaAccessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = parse_script(&sql);
    debug!(path = %path.display(), tables = snapshot.len(), "parsed schema script");
    Ok(snapshot)
}

/// Kind of store behind a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// DuckDB database file
    #[default]
    DuckDb,
    /// SQLite database file
    Sqlite,
    /// SQL script with CREATE TABLE statements
    SqlScript,
}

impl SourceKind {
    /// Detect the store kind of a path.
    ///
    /// `.sql`/`.ddl` are scripts, `.sqlite`/`.sqlite3`/`.db3` are SQLite and
    /// `.duckdb` is DuckDB. Any other file is SQLite when it starts with the
    /// SQLite header and DuckDB otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("sql") | Some("ddl") => SourceKind::SqlScript,
            Some("sqlite") | Some("sqlite3") | Some("db3") => SourceKind::Sqlite,
            Some("duckdb") => SourceKind::DuckDb,
            _ if has_sqlite_header(path) => SourceKind::Sqlite,
            _ => SourceKind::DuckDb,
        }
    }

    /// Whether this kind is a database that rows can be read from
    pub fn is_database(self) -> bool {
        !matches!(self, SourceKind::SqlScript)
    }
}

fn has_sqlite_header(path: &Path) -> bool {
    let mut header = [0u8; 16];
    fs::File::open(path)
        .and_then(|mut f| f.read_exact(&mut header))
        .map(|_| &header == sqlite_source::SQLITE_HEADER)
        .unwrap_or(false)
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duckdb" | "db" => Ok(SourceKind::DuckDb),
            "sqlite" | "sqlite3" => Ok(SourceKind::Sqlite),
            "sql" | "script" | "ddl" => Ok(SourceKind::SqlScript),
            _ => Err(format!(
                "Unknown source kind: {}. Valid options: duckdb, sqlite, sql",
                s
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::DuckDb => write!(f, "duckdb"),
            SourceKind::Sqlite => write!(f, "sqlite"),
            SourceKind::SqlScript => write!(f, "sql"),
        }
    }
}

/// Introspect whatever store lives at `path`
pub fn load_snapshot(
    path: &Path,
    kind: Option<SourceKind>,
) -> Result<SchemaSnapshot, SchemaAccessError> {
    match kind.unwrap_or_else(|| SourceKind::from_path(path)) {
        SourceKind::SqlScript => load_script(path),
        SourceKind::DuckDb => introspect(&DuckDbSource::open(path)?),
        SourceKind::Sqlite => introspect(&SqliteSource::open(path)?),
    }
}

/// Read the first `limit` rows of `table` from the database at `path`.
///
/// Scripts hold no rows and are rejected with [`SchemaAccessError::Open`].
pub fn preview_rows(
    path: &Path,
    kind: Option<SourceKind>,
    table: &str,
    limit: usize,
) -> Result<RowPreview, SchemaAccessError> {
    match kind.unwrap_or_else(|| SourceKind::from_path(path)) {
        SourceKind::DuckDb => DuckDbSource::open(path)?.preview_rows(table, limit),
        SourceKind::Sqlite => SqliteSource::open(path)?.preview_rows(table, limit),
        SourceKind::SqlScript => Err(SchemaAccessError::Open {
            path: path.to_path_buf(),
            reason: "a schema script holds no rows".to_string(),
        }),
    }
}
