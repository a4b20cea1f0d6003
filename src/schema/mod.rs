//! Schema snapshot model produced by introspection.
//!
//! This module provides:
//! - Plain records for tables, columns and declared foreign keys
//! - An ordered snapshot registry with case-insensitive table lookup
//! - DDL parsing for building snapshots from SQL scripts
//! - The `referenced_by` reverse index over foreign keys

mod ddl;

pub use ddl::*;

use ahash::AHashMap;
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a table within a snapshot (declaration order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.0)
    }
}

/// Column metadata as reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRecord {
    /// Column name
    pub name: String,
    /// Declared SQL type, verbatim (may be empty for typeless SQLite columns)
    pub declared_type: String,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
}

impl ColumnRecord {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            is_primary_key: false,
        }
    }

    /// Mark this column as a primary key column
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }
}

/// One column pair of a declared foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRecord {
    /// Column in the declaring table
    pub from_column: String,
    /// Referenced table name (not validated)
    pub to_table: String,
    /// Referenced column name (not validated); empty when the declaration
    /// names no column and so targets the referenced table's primary key
    pub to_column: String,
}

impl ForeignKeyRecord {
    pub fn new(
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
        }
    }

    /// `REFERENCES table` without a column list
    pub fn to_primary_key(from_column: impl Into<String>, to_table: impl Into<String>) -> Self {
        Self::new(from_column, to_table, "")
    }

    /// Whether the referenced column is left to the target's primary key
    pub fn targets_primary_key(&self) -> bool {
        self.to_column.is_empty()
    }
}

/// Introspected table: ordered columns plus declared foreign keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    /// Table name
    pub name: String,
    /// Column definitions in declaration order
    pub columns: Vec<ColumnRecord>,
    /// Foreign keys, one record per column pair
    pub foreign_keys: Vec<ForeignKeyRecord>,
}

impl TableRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Builder-style column append
    pub fn with_column(mut self, column: ColumnRecord) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder-style foreign key append
    pub fn with_foreign_key(mut self, fk: ForeignKeyRecord) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&ColumnRecord> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get mutable column by name (case-insensitive)
    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut ColumnRecord> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// Point-in-time result of one introspection pass.
///
/// Tables keep the order the store reported them in; that order drives the
/// default Grid and Circular layouts.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    /// Map from table name to table ID
    tables: AHashMap<String, TableId>,
    /// Table records indexed by TableId
    records: Vec<TableRecord>,
}

impl SchemaSnapshot {
    /// Create a new empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table record, returning its ID.
    ///
    /// A second record with an already-known name is ignored and the existing
    /// ID returned.
    pub fn add_table(&mut self, record: TableRecord) -> TableId {
        if let Some(&id) = self.tables.get(&record.name) {
            return id;
        }
        let id = TableId(self.records.len() as u32);
        self.tables.insert(record.name.clone(), id);
        self.records.push(record);
        id
    }

    /// Get table ID by name (exact first, then case-insensitive)
    pub fn get_table_id(&self, name: &str) -> Option<TableId> {
        if let Some(&id) = self.tables.get(name) {
            return Some(id);
        }
        self.tables
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, &id)| id)
    }

    /// Get table record by ID
    pub fn table(&self, id: TableId) -> Option<&TableRecord> {
        self.records.get(id.0 as usize)
    }

    /// Get mutable table record by ID
    pub fn table_mut(&mut self, id: TableId) -> Option<&mut TableRecord> {
        self.records.get_mut(id.0 as usize)
    }

    /// Get table record by name
    pub fn get_table(&self, name: &str) -> Option<&TableRecord> {
        self.get_table_id(name).and_then(|id| self.table(id))
    }

    /// Iterate over all table records in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &TableRecord> {
        self.records.iter()
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Referenced column of a foreign key.
    ///
    /// A key declared without a column resolves to the target table's
    /// primary key, provided that key is a single column.
    pub fn target_column<'a>(&'a self, fk: &'a ForeignKeyRecord) -> Option<&'a str> {
        if !fk.targets_primary_key() {
            return Some(fk.to_column.as_str());
        }
        let target = self.get_table(&fk.to_table)?;
        let mut pk = target.columns.iter().filter(|c| c.is_primary_key);
        match (pk.next(), pk.next()) {
            (Some(col), None) => Some(col.name.as_str()),
            _ => None,
        }
    }

    /// Reverse foreign-key index for one table.
    ///
    /// Maps each referenced column of `table` to the other tables that declare
    /// a foreign key onto it. Self references are not listed. Cost is one scan
    /// over every table's foreign keys.
    pub fn referenced_by(&self, table: &str) -> BTreeMap<String, Vec<String>> {
        let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some(target) = self.get_table(table) else {
            return index;
        };

        for other in self.iter() {
            if other.name == target.name {
                continue;
            }
            for fk in &other.foreign_keys {
                if !fk.to_table.eq_ignore_ascii_case(&target.name) {
                    continue;
                }
                let Some(column) = self.target_column(fk) else {
                    continue;
                };
                let referrers = index.entry(column.to_string()).or_default();
                if !referrers.contains(&other.name) {
                    referrers.push(other.name.clone());
                }
            }
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_table_keeps_first_record() {
        let mut snapshot = SchemaSnapshot::new();
        let first = snapshot.add_table(TableRecord::new("users"));
        let second = snapshot.add_table(
            TableRecord::new("users").with_column(ColumnRecord::new("id", "INT")),
        );

        assert_eq!(first, second);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get_table("users").unwrap().columns.is_empty());
    }

    #[test]
    fn test_target_column_falls_back_to_single_primary_key() {
        let mut snapshot = SchemaSnapshot::new();
        snapshot.add_table(
            TableRecord::new("currencies")
                .with_column(ColumnRecord::new("code", "TEXT").primary_key()),
        );
        snapshot.add_table(
            TableRecord::new("pairs")
                .with_column(ColumnRecord::new("base", "TEXT").primary_key())
                .with_column(ColumnRecord::new("quote", "TEXT").primary_key()),
        );

        let implicit = ForeignKeyRecord::to_primary_key("currency", "currencies");
        assert_eq!(snapshot.target_column(&implicit), Some("code"));

        let explicit = ForeignKeyRecord::new("currency", "currencies", "name");
        assert_eq!(snapshot.target_column(&explicit), Some("name"));

        let composite = ForeignKeyRecord::to_primary_key("pair", "pairs");
        assert_eq!(snapshot.target_column(&composite), None);

        let missing = ForeignKeyRecord::to_primary_key("x", "ghosts");
        assert_eq!(snapshot.target_column(&missing), None);
    }

    #[test]
    fn test_table_lookup_is_case_insensitive() {
        let mut snapshot = SchemaSnapshot::new();
        let id = snapshot.add_table(TableRecord::new("Users"));

        assert_eq!(snapshot.get_table_id("Users"), Some(id));
        assert_eq!(snapshot.get_table_id("USERS"), Some(id));
        assert_eq!(snapshot.get_table_id("orders"), None);
    }
}
