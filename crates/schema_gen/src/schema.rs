//! Schema model for defining tables, columns, and relationships.
//!
//! Rendered DDL uses inline `PRIMARY KEY` and table-level
//! `FOREIGN KEY (...) REFERENCES ...` constraints, which both DuckDB and the
//! schema-canvas script loader accept.

use std::fmt::Write;

/// SQL data types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlType {
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    BigInt,
    /// Variable-length string
    VarChar(u16),
    /// Unlimited text
    Text,
    /// Boolean
    Boolean,
    /// Decimal with precision and scale
    Decimal(u8, u8),
    /// Timestamp
    Timestamp,
    /// Date only
    Date,
}

impl SqlType {
    /// Returns the SQL type string
    pub fn to_sql(&self) -> String {
        match self {
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::VarChar(n) => format!("VARCHAR({})", n),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Decimal(p, s) => format!("DECIMAL({},{})", p, s),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Date => "DATE".to_string(),
        }
    }

    /// A literal of this type for row `row` (1-based)
    pub fn sample_literal(&self, column: &str, row: usize) -> String {
        match self {
            SqlType::Integer | SqlType::BigInt => row.to_string(),
            SqlType::VarChar(_) | SqlType::Text => format!("'{}_{}'", column, row),
            SqlType::Boolean => (row % 2 == 0).to_string(),
            SqlType::Decimal(_, _) => format!("{}.{:02}", row, row % 100),
            SqlType::Timestamp => format!("'2024-01-{:02} 12:00:00'", row % 28 + 1),
            SqlType::Date => format!("'2024-01-{:02}'", row % 28 + 1),
        }
    }
}

/// Foreign key target
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub to_table: String,
    pub to_column: String,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
    pub not_null: bool,
    pub primary_key: bool,
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            not_null: false,
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            to_table: table.into(),
            to_column: column.into(),
        });
        self
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, col: Column) -> Self {
        self.columns.push(col);
        self
    }

    /// Columns that declare a foreign key
    pub fn foreign_keys(&self) -> impl Iterator<Item = (&Column, &ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.foreign_key.as_ref().map(|fk| (c, fk)))
    }

    /// Render the CREATE TABLE statement
    pub fn to_ddl(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", c.name, c.sql_type.to_sql());
                if c.primary_key {
                    def.push_str(" PRIMARY KEY");
                } else if c.not_null {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();

        for (col, fk) in self.foreign_keys() {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {}({})",
                col.name, fk.to_table, fk.to_column
            ));
        }

        format!("CREATE TABLE {} (\n    {}\n);\n", self.name, parts.join(",\n    "))
    }

    /// Render `rows` INSERT rows. Foreign-key columns point at ids `1..=rows`
    /// of their target table.
    pub fn to_inserts(&self, rows: usize) -> String {
        let mut out = String::new();
        if rows == 0 {
            return out;
        }

        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "INSERT INTO {} ({}) VALUES", self.name, names.join(", "));

        for row in 1..=rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.sql_type.sample_literal(&c.name, row))
                .collect();
            let sep = if row == rows { ";" } else { "," };
            let _ = writeln!(out, "    ({}){}", values.join(", "), sep);
        }

        out
    }
}

/// Complete schema definition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<Table>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Number of foreign keys whose target table exists
    pub fn resolvable_fk_count(&self) -> usize {
        self.tables
            .iter()
            .flat_map(|t| t.foreign_keys())
            .filter(|(_, fk)| self.get_table(&fk.to_table).is_some())
            .count()
    }

    /// Render every table's CREATE TABLE statement in order
    pub fn to_ddl(&self) -> String {
        self.tables
            .iter()
            .map(Table::to_ddl)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render DDL followed by `rows` rows per table
    pub fn to_sql_with_rows(&self, rows: usize) -> String {
        let mut out = self.to_ddl();
        for table in &self.tables {
            out.push('\n');
            out.push_str(&table.to_inserts(rows));
        }
        out
    }
}
