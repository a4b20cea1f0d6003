//! DuckDB catalog introspection and read-only row preview.

use super::{RowPreview, SchemaSource};
use crate::error::SchemaAccessError;
use crate::schema::{ColumnRecord, ForeignKeyRecord};
use duckdb::types::ValueRef;
use duckdb::{params, AccessMode, Config, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

const TABLES_SQL: &str = "SELECT table_name FROM duckdb_tables() \
     WHERE database_name = current_database() AND schema_name = current_schema() \
     AND NOT internal AND NOT temporary \
     ORDER BY table_oid";

const COLUMNS_SQL: &str = "SELECT column_name, data_type FROM duckdb_columns() \
     WHERE database_name = current_database() AND schema_name = current_schema() \
     AND table_name = ? \
     ORDER BY column_index";

const PRIMARY_KEY_SQL: &str = "SELECT unnest(constraint_column_names) FROM duckdb_constraints() \
     WHERE database_name = current_database() AND schema_name = current_schema() \
     AND table_name = ? AND constraint_type = 'PRIMARY KEY'";

// Parallel unnest zips local and referenced column lists pairwise
const FOREIGN_KEY_SQL: &str = "SELECT unnest(constraint_column_names), referenced_table, \
     unnest(referenced_column_names) FROM duckdb_constraints() \
     WHERE database_name = current_database() AND schema_name = current_schema() \
     AND table_name = ? AND constraint_type = 'FOREIGN KEY'";

/// Schema source backed by a DuckDB connection
pub struct DuckDbSource {
    conn: Connection,
    path: Option<PathBuf>,
}

impl DuckDbSource {
    /// Open a database file read-only.
    ///
    /// A missing file is an error rather than an empty database; a file held
    /// by a writer in another process maps to [`SchemaAccessError::Locked`].
    pub fn open(path: &Path) -> Result<Self, SchemaAccessError> {
        if !path.exists() {
            return Err(SchemaAccessError::Open {
                path: path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let config = Config::default()
            .access_mode(AccessMode::ReadOnly)
            .map_err(|e| open_error(path, e))?;
        let conn = Connection::open_with_flags(path, config).map_err(|e| open_error(path, e))?;

        debug!(path = %path.display(), "opened duckdb store read-only");
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
        let mut rows_result = stmt
            .query([])
            .map_err(|e| SchemaAccessError::query(&name, e))?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut column_count = 0;

        while let Some(row) = rows_result
            .next()
            .map_err(|e| SchemaAccessError::query(&name, e))?
        {
            if column_count == 0 {
                column_count = row.as_ref().column_count();
            }
            let values = (0..column_count)
                .map(|i| match row.get_ref(i) {
                    Ok(value) => format_value(value),
                    Err(_) => "ERROR".to_string(),
                })
                .collect();
            rows.push(values);
        }

        // Drop the rows iterator to release the mutable borrow
        drop(rows_result);

        let columns = (0..stmt.column_count())
            .map(|i| {
                stmt.column_name(i)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|_| format!("col{}", i))
            })
            .collect();

        Ok(RowPreview { columns, rows })
    }

    /// Run a catalog query bound to one table name, reading `width` text columns
    fn query_strings(
        &self,
        sql: &str,
        table: &str,
        width: usize,
    ) -> Result<Vec<Vec<String>>, SchemaAccessError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| SchemaAccessError::query(table, e))?;

        let rows = stmt
            .query_map(params![table], |row| {
                (0..width)
                    .map(|i| row.get::<_, Option<String>>(i).map(Option::unwrap_or_default))
                    .collect::<Result<Vec<String>, _>>()
            })
            .map_err(|e| SchemaAccessError::query(table, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SchemaAccessError::query(table, e))?;

        Ok(rows)
    }
}

impl SchemaSource for DuckDbSource {
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
        let primary_key: Vec<String> = self
            .query_strings(PRIMARY_KEY_SQL, table, 1)?
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect();

        let columns = self
            .query_strings(COLUMNS_SQL, table, 2)?
            .into_iter()
            .filter_map(|row| {
                let mut fields = row.into_iter();
                let name = fields.next()?;
                let declared_type = fields.next().unwrap_or_default();
                let is_primary_key = primary_key.contains(&name);
                Some(ColumnRecord {
                    name,
                    declared_type,
                    is_primary_key,
                })
            })
            .collect();

        Ok(columns)
    }

    fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyRecord>, SchemaAccessError> {
        let fks = self
            .query_strings(FOREIGN_KEY_SQL, table, 3)?
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                [from, to_table, to_column] => Some(ForeignKeyRecord::new(
                    from.clone(),
                    to_table.clone(),
                    to_column.clone(),
                )),
                _ => None,
            })
            .collect();

        Ok(fks)
    }
}

fn open_error(path: &Path, err: duckdb::Error) -> SchemaAccessError {
    classify_open_failure(path, err.to_string())
}

/// Another process holding the write lock reports "Could not set lock on file"
fn classify_open_failure(path: &Path, reason: String) -> SchemaAccessError {
    if reason.to_lowercase().contains("lock") {
        SchemaAccessError::Locked {
            path: path.to_path_buf(),
            reason,
        }
    } else {
        SchemaAccessError::Open {
            path: path.to_path_buf(),
            reason,
        }
    }
}

/// Double-quote an identifier, doubling embedded quotes
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Boolean(b) => b.to_string(),
        ValueRef::TinyInt(n) => n.to_string(),
        ValueRef::SmallInt(n) => n.to_string(),
        ValueRef::Int(n) => n.to_string(),
        ValueRef::BigInt(n) => n.to_string(),
        ValueRef::HugeInt(n) => n.to_string(),
        ValueRef::UTinyInt(n) => n.to_string(),
        ValueRef::USmallInt(n) => n.to_string(),
        ValueRef::UInt(n) => n.to_string(),
        ValueRef::UBigInt(n) => n.to_string(),
        ValueRef::Float(f) => f.to_string(),
        ValueRef::Double(f) => f.to_string(),
        ValueRef::Decimal(d) => d.to_string(),
        ValueRef::Text(s) => String::from_utf8_lossy(s).to_string(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
        ValueRef::Timestamp(_, ts) => {
            // Microseconds since epoch
            let secs = ts.div_euclid(1_000_000);
            let nanos = (ts.rem_euclid(1_000_000) * 1000) as u32;
            chrono::DateTime::from_timestamp(secs, nanos)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| ts.to_string())
        }
        ValueRef::Date32(days) => {
            // 719163 = days from 0001-01-01 to 1970-01-01
            chrono::NaiveDate::from_num_days_from_ce_opt(719_163 + days)
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| days.to_string())
        }
        other => format!("{:?}", other),
    }
}
