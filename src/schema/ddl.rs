//! DDL parsing for building schema snapshots from SQL scripts.
//!
//! Parses CREATE TABLE and ALTER TABLE statements to extract:
//! - Column definitions with declared types
//! - Primary key constraints (inline and table-level)
//! - Foreign key constraints (table-level, inline REFERENCES, ALTER TABLE)

use super::{ColumnRecord, ForeignKeyRecord, SchemaSnapshot, TableRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Regex to extract table name from CREATE TABLE
/// Supports: `table` (MySQL), "table" (PostgreSQL), [table] (MSSQL), table (SQLite/unquoted), schema.table
static CREATE_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*CREATE\s+(?:TEMP(?:ORARY)?\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?"#)
        .unwrap()
});

/// Regex to extract table name from ALTER TABLE
static ALTER_TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*ALTER\s+TABLE\s+(?:ONLY\s+)?(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s]+)[\]`"]?"#).unwrap()
});

/// Regex for column definition: name followed by an optional type.
/// SQLite allows typeless columns, so the type group is optional.
static COLUMN_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^\s*[\[`"]?([^\[\]`"\s,]+)[\]`"]?(?:\s+(\w+(?:\s+(?:varying|precision))?(?:\s*\([^)]+\))?(?:\s+unsigned)?))?"#).unwrap()
});

/// Regex for PRIMARY KEY constraint
/// Supports MSSQL CLUSTERED/NONCLUSTERED keywords: PRIMARY KEY CLUSTERED ([col])
static PRIMARY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)PRIMARY\s+KEY\s*(?:CLUSTERED\s+|NONCLUSTERED\s+)?\(([^)]+)\)").unwrap()
});

/// Regex for inline PRIMARY KEY on column
static INLINE_PRIMARY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPRIMARY\s+KEY\b").unwrap());

/// Regex for FOREIGN KEY constraint with optional constraint name
static FOREIGN_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:CONSTRAINT\s+[\[`"]?[^\[\]`"\s]+[\]`"]?\s+)?FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*(?:\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Regex for a column-level REFERENCES clause: `user_id INT REFERENCES users(id)`
static INLINE_REFERENCES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bREFERENCES\s+(?:[\[\]`"\w]+\s*\.\s*)*[\[`"]?([^\[\]`"\s(]+)[\]`"]?\s*(?:\(([^)]+)\))?"#,
    )
    .unwrap()
});

/// Table-level constraint at the start of a body segment.
/// `KEY`, `INDEX`, `UNIQUE` and friends only count when an optional index name
/// is followed by a column list, so columns named `key` or `index` survive and
/// so does `key VARCHAR(255)`.
static TABLE_CONSTRAINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(?:CONSTRAINT\s|PRIMARY\s+KEY\b|FOREIGN\s+KEY\b|CHECK\s*\(|(?:(?:UNIQUE|FULLTEXT|SPATIAL)(?:\s+(?:KEY|INDEX))?|KEY|INDEX)\s*(?:[\w`"\[\]]+\s*)?(?:(?:NON)?CLUSTERED\s*)?\(\s*[\[`"]?[A-Za-z_])"#,
    )
    .unwrap()
});

/// Builder for constructing a snapshot from DDL statements
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    snapshot: SchemaSnapshot,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a CREATE TABLE statement and add it to the snapshot.
    ///
    /// Returns the table name, or `None` if the statement is not a
    /// parseable CREATE TABLE.
    pub fn parse_create_table(&mut self, stmt: &str) -> Option<String> {
        let table_name = extract_create_table_name(stmt)?;

        if let Some(existing) = self.snapshot.get_table(&table_name) {
            return Some(existing.name.clone());
        }

        let body = extract_table_body(stmt)?;
        let mut table = TableRecord::new(table_name.clone());
        parse_table_body(&body, &mut table);

        self.snapshot.add_table(table);
        Some(table_name)
    }

    /// Parse an ALTER TABLE statement, attaching any FOREIGN KEY it adds
    pub fn parse_alter_table(&mut self, stmt: &str) -> Option<String> {
        let table_name = extract_alter_table_name(stmt)?;
        let table_id = self.snapshot.get_table_id(&table_name)?;
        let table = self.snapshot.table_mut(table_id)?;

        table.foreign_keys.extend(parse_foreign_keys(stmt));
        if let Some(pk_cols) = parse_primary_key_constraint(stmt) {
            mark_primary_key(table, &pk_cols);
        }

        Some(table.name.clone())
    }

    /// Feed a whole SQL script, statement by statement
    pub fn parse_script(&mut self, sql: &str) {
        for stmt in split_statements(sql) {
            let head = stmt.trim_start().to_ascii_uppercase();
            if head.starts_with("CREATE") && CREATE_TABLE_NAME_RE.is_match(&stmt) {
                self.parse_create_table(&stmt);
            } else if head.starts_with("ALTER") {
                self.parse_alter_table(&stmt);
            }
        }
    }

    /// Finalize the snapshot
    pub fn build(self) -> SchemaSnapshot {
        self.snapshot
    }

    /// Get current snapshot (for inspection during building)
    pub fn snapshot(&self) -> &SchemaSnapshot {
        &self.snapshot
    }
}

/// Parse a SQL script into a snapshot in one call
pub fn parse_script(sql: &str) -> SchemaSnapshot {
    let mut builder = SchemaBuilder::new();
    builder.parse_script(sql);
    builder.build()
}

/// Extract table name from CREATE TABLE statement
pub fn extract_create_table_name(stmt: &str) -> Option<String> {
    CREATE_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract table name from ALTER TABLE statement
pub fn extract_alter_table_name(stmt: &str) -> Option<String> {
    ALTER_TABLE_NAME_RE
        .captures(stmt)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split a script into statements on `;`, ignoring semicolons inside string
/// literals, quoted identifiers and comments. Comments are dropped.
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q {
                // Doubled quote is an escaped quote inside the literal
                if chars.peek() == Some(&q) {
                    current.push(q);
                    chars.next();
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match ch {
            '\'' | '"' | '`' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                quote = Some(']');
                current.push(ch);
            }
            '-' if chars.peek() == Some(&'-') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        current.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                current.push(' ');
            }
            ';' => {
                if !current.trim().is_empty() {
                    statements.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }

    statements
}

/// Extract the body of a CREATE TABLE statement (between first ( and matching ))
fn extract_table_body(stmt: &str) -> Option<String> {
    let bytes = stmt.as_bytes();
    let mut depth = 0;
    let mut start = None;
    let mut in_string = false;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\'' {
            in_string = !in_string;
            continue;
        }

        if in_string {
            continue;
        }

        if b == b'(' {
            if depth == 0 {
                start = Some(i + 1);
            }
            depth += 1;
        } else if b == b')' {
            depth -= 1;
            if depth == 0 {
                if let Some(s) = start {
                    return Some(stmt[s..i].to_string());
                }
            }
        }
    }

    None
}

/// Parse the body of a CREATE TABLE to extract columns and constraints
fn parse_table_body(body: &str, table: &mut TableRecord) {
    for part in split_table_body(body) {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        if TABLE_CONSTRAINT_RE.is_match(trimmed) {
            if let Some(pk_cols) = parse_primary_key_constraint(trimmed) {
                mark_primary_key(table, &pk_cols);
            }
            table.foreign_keys.extend(parse_foreign_keys(trimmed));
        } else if let Some(mut col) = parse_column_def(trimmed) {
            if INLINE_PRIMARY_KEY_RE.is_match(trimmed) {
                col.is_primary_key = true;
            }
            if let Some(fk) = parse_inline_reference(&col.name, trimmed) {
                table.foreign_keys.push(fk);
            }
            table.columns.push(col);
        }
    }
}

fn mark_primary_key(table: &mut TableRecord, pk_cols: &[String]) {
    for col_name in pk_cols {
        if let Some(col) = table.get_column_mut(col_name) {
            col.is_primary_key = true;
        }
    }
}

/// Split table body by commas, respecting nested parentheses
pub fn split_table_body(body: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    let mut in_string = false;

    for ch in body.chars() {
        if ch == '\'' {
            in_string = !in_string;
            current.push(ch);
            continue;
        }

        if in_string {
            current.push(ch);
            continue;
        }

        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Parse a column definition
fn parse_column_def(def: &str) -> Option<ColumnRecord> {
    let caps = COLUMN_DEF_RE.captures(def)?;
    let name = caps.get(1)?.as_str().to_string();
    let declared_type = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .filter(|t| !is_constraint_keyword(t))
        .unwrap_or_default();

    Some(ColumnRecord::new(name, declared_type))
}

/// A typeless SQLite column may be followed directly by a constraint keyword
fn is_constraint_keyword(word: &str) -> bool {
    matches!(
        word.to_ascii_uppercase().as_str(),
        "PRIMARY" | "NOT" | "NULL" | "REFERENCES" | "UNIQUE" | "DEFAULT" | "CHECK" | "CONSTRAINT"
    )
}

/// Parse PRIMARY KEY constraint, returns column names
fn parse_primary_key_constraint(constraint: &str) -> Option<Vec<String>> {
    let caps = PRIMARY_KEY_RE.captures(constraint)?;
    let cols_str = caps.get(1)?.as_str();
    Some(parse_column_list(cols_str))
}

/// Parse FOREIGN KEY constraints, flattening composite keys into column pairs
fn parse_foreign_keys(stmt: &str) -> Vec<ForeignKeyRecord> {
    let mut fks = Vec::new();

    for caps in FOREIGN_KEY_RE.captures_iter(stmt) {
        let local_cols = caps
            .get(1)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();
        let ref_table = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let ref_cols = caps
            .get(3)
            .map(|m| parse_column_list(m.as_str()))
            .unwrap_or_default();

        if ref_table.is_empty() {
            continue;
        }

        if ref_cols.is_empty() {
            fks.extend(
                local_cols
                    .iter()
                    .map(|local| ForeignKeyRecord::to_primary_key(local.clone(), ref_table.clone())),
            );
            continue;
        }

        for (local, referenced) in local_cols.iter().zip(ref_cols.iter()) {
            fks.push(ForeignKeyRecord::new(
                local.clone(),
                ref_table.clone(),
                referenced.clone(),
            ));
        }
    }

    fks
}

/// Parse a column-level `REFERENCES table(col)` clause.
/// Without a column list the reference targets the table's primary key.
fn parse_inline_reference(column: &str, def: &str) -> Option<ForeignKeyRecord> {
    let caps = INLINE_REFERENCES_RE.captures(def)?;
    let ref_table = caps.get(1)?.as_str().to_string();

    match caps
        .get(2)
        .and_then(|m| parse_column_list(m.as_str()).into_iter().next())
    {
        Some(ref_column) => Some(ForeignKeyRecord::new(column, ref_table, ref_column)),
        None => Some(ForeignKeyRecord::to_primary_key(column, ref_table)),
    }
}

/// Parse a comma-separated column list, stripping quotes (backticks, double quotes, brackets)
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|c| {
            c.trim()
                .trim_matches('`')
                .trim_matches('"')
                .trim_matches('[')
                .trim_matches(']')
                .to_string()
        })
        .filter(|c| !c.is_empty())
        .collect()
}
