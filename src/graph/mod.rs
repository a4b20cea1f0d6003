//! Relationship graph built from a schema snapshot.
//!
//! This module provides:
//! - Table nodes with card metrics (header/row heights, width)
//! - Column-level foreign-key edges, validated against the snapshot
//! - Dangling foreign-key warnings instead of build failures
//! - Structural queries: neighbours, incident edges, column roles
//! - Filtered/focused subgraphs (see [`view`])

pub mod view;

use crate::error::SchemaAccessError;
use crate::introspect::{introspect, SchemaSource};
use crate::schema::{SchemaSnapshot, TableRecord};
use ahash::AHashMap;
use std::collections::BTreeSet;
use std::fmt;
use tracing::warn;

/// Default card width
pub const DEFAULT_CARD_WIDTH: f64 = 240.0;
/// Default card header height
pub const DEFAULT_HEADER_HEIGHT: f64 = 40.0;
/// Default height of one column row
pub const DEFAULT_ROW_HEIGHT: f64 = 28.0;

/// Card dimensions applied to every node of a graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardMetrics {
    pub width: f64,
    pub header_height: f64,
    pub row_height: f64,
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self {
            width: DEFAULT_CARD_WIDTH,
            header_height: DEFAULT_HEADER_HEIGHT,
            row_height: DEFAULT_ROW_HEIGHT,
        }
    }
}

/// Target of a foreign-key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRef {
    pub table: String,
    pub column: String,
}

/// A column as shown on a table card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Declared SQL type
    pub declared_type: String,
    /// Whether this column is part of the primary key
    pub is_primary_key: bool,
    /// Whether this column declares a foreign key
    pub is_foreign_key: bool,
    /// First declared foreign-key target, as written (may dangle)
    pub foreign_ref: Option<ForeignRef>,
}

/// Role of a column for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Plain,
    PrimaryKey,
    ForeignKey,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Plain => write!(f, "plain"),
            ColumnRole::PrimaryKey => write!(f, "primary_key"),
            ColumnRole::ForeignKey => write!(f, "foreign_key"),
        }
    }
}

impl ColumnSpec {
    /// Primary key wins over foreign key when a column is both
    pub fn role(&self) -> ColumnRole {
        if self.is_primary_key {
            ColumnRole::PrimaryKey
        } else if self.is_foreign_key {
            ColumnRole::ForeignKey
        } else {
            ColumnRole::Plain
        }
    }
}

/// One table card. Holds no position; positions live in a
/// [`crate::layout::PositionMap`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableNode {
    /// Table name (unique within the graph)
    pub name: String,
    /// Columns in declaration order
    pub columns: Vec<ColumnSpec>,
    pub width: f64,
    pub header_height: f64,
    pub row_height: f64,
}

impl TableNode {
    /// Number of column rows
    pub fn row_count(&self) -> usize {
        self.columns.len()
    }

    /// Card height: header plus one row per column
    pub fn height(&self) -> f64 {
        self.header_height + self.row_count() as f64 * self.row_height
    }

    /// Index of a column by name (exact first, then case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.name.eq_ignore_ascii_case(name))
            })
    }
}

/// A foreign-key relationship between two columns.
///
/// Invariant: both tables exist in the owning graph and both indices are in
/// bounds of their table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipEdge {
    /// Table declaring the foreign key
    pub source_table: String,
    pub source_column_index: usize,
    /// Referenced table
    pub target_table: String,
    pub target_column_index: usize,
}

impl RelationshipEdge {
    pub fn touches(&self, table: &str) -> bool {
        self.source_table == table || self.target_table == table
    }

    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }
}

/// Why a declared foreign key produced no edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DanglingReason {
    /// Referenced table is not in the snapshot
    MissingTable,
    /// Referenced table exists but lacks the referenced column
    MissingColumn,
    /// The declaring column itself is not among the table's columns
    MissingSourceColumn,
}

/// Non-fatal problems found while building a graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphWarning {
    DanglingForeignKey {
        table: String,
        column: String,
        referenced_table: String,
        referenced_column: String,
        reason: DanglingReason,
    },
}

impl fmt::Display for GraphWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphWarning::DanglingForeignKey {
                table,
                column,
                referenced_table,
                referenced_column,
                reason,
            } => {
                if referenced_column.is_empty() {
                    write!(
                        f,
                        "Dangling foreign key {}.{} -> {}",
                        table, column, referenced_table
                    )?;
                } else {
                    write!(
                        f,
                        "Dangling foreign key {}.{} -> {}.{}",
                        table, column, referenced_table, referenced_column
                    )?;
                }
                match reason {
                    DanglingReason::MissingTable => {
                        write!(f, " (table '{}' not found)", referenced_table)
                    }
                    DanglingReason::MissingColumn if referenced_column.is_empty() => write!(
                        f,
                        " (no single-column primary key in '{}')",
                        referenced_table
                    ),
                    DanglingReason::MissingColumn => write!(
                        f,
                        " (column '{}' not found in '{}')",
                        referenced_column, referenced_table
                    ),
                    DanglingReason::MissingSourceColumn => {
                        write!(f, " (column '{}' not found in '{}')", column, table)
                    }
                }
            }
        }
    }
}

/// Immutable table/edge model of one schema snapshot.
///
/// Built atomically; a schema change means building a new graph.
#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    /// Nodes in declaration order
    nodes: Vec<TableNode>,
    /// Map from table name to node index
    index: AHashMap<String, usize>,
    /// Surviving foreign-key edges
    edges: Vec<RelationshipEdge>,
    /// Problems encountered during the build
    warnings: Vec<GraphWarning>,
}

impl RelationshipGraph {
    /// Build a graph with the default card metrics
    pub fn from_snapshot(snapshot: &SchemaSnapshot) -> Self {
        Self::with_metrics(snapshot, CardMetrics::default())
    }

    /// Build a graph from a snapshot.
    ///
    /// Foreign keys whose declaring column, referenced table or referenced
    /// column cannot be resolved are dropped with a [`GraphWarning`].
    pub fn with_metrics(snapshot: &SchemaSnapshot, metrics: CardMetrics) -> Self {
        let mut graph = Self::default();

        for table in snapshot.iter() {
            if graph.index.contains_key(&table.name) {
                continue;
            }
            graph.index.insert(table.name.clone(), graph.nodes.len());
            graph.nodes.push(build_node(snapshot, table, metrics));
        }

        for table in snapshot.iter() {
            for fk in &table.foreign_keys {
                let to_column = snapshot.target_column(fk).unwrap_or(fk.to_column.as_str());
                match graph.resolve_edge(&table.name, &fk.from_column, &fk.to_table, to_column) {
                    Ok(edge) => graph.edges.push(edge),
                    Err(reason) => {
                        let warning = GraphWarning::DanglingForeignKey {
                            table: table.name.clone(),
                            column: fk.from_column.clone(),
                            referenced_table: fk.to_table.clone(),
                            referenced_column: to_column.to_string(),
                            reason,
                        };
                        warn!("{}", warning);
                        graph.warnings.push(warning);
                    }
                }
            }
        }

        graph
    }

    fn resolve_edge(
        &self,
        source_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) -> Result<RelationshipEdge, DanglingReason> {
        let source = self
            .node(source_table)
            .ok_or(DanglingReason::MissingSourceColumn)?;
        let source_column_index = source
            .column_index(from_column)
            .ok_or(DanglingReason::MissingSourceColumn)?;
        let target = self
            .lookup(to_table)
            .ok_or(DanglingReason::MissingTable)?;
        let target_column_index = target
            .column_index(to_column)
            .ok_or(DanglingReason::MissingColumn)?;

        Ok(RelationshipEdge {
            source_table: source.name.clone(),
            source_column_index,
            target_table: target.name.clone(),
            target_column_index,
        })
    }

    /// Exact name lookup, then case-insensitive fallback
    fn lookup(&self, name: &str) -> Option<&TableNode> {
        self.node(name).or_else(|| {
            self.nodes
                .iter()
                .find(|n| n.name.eq_ignore_ascii_case(name))
        })
    }

    /// Assemble a graph from parts already known to satisfy the invariants
    pub(crate) fn from_parts(
        nodes: Vec<TableNode>,
        edges: Vec<RelationshipEdge>,
        warnings: Vec<GraphWarning>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.name.clone(), i))
            .collect();
        Self {
            nodes,
            index,
            edges,
            warnings,
        }
    }

    /// Get a node by exact table name
    pub fn node(&self, name: &str) -> Option<&TableNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Position of a node in declaration order
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Check whether a table is part of the graph
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> &[TableNode] {
        &self.nodes
    }

    /// All edges in declaration order
    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Warnings collected while building
    pub fn warnings(&self) -> &[GraphWarning] {
        &self.warnings
    }

    /// Get the number of tables
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Tables connected to `table` in either direction, excluding itself
    pub fn neighbors(&self, table: &str) -> BTreeSet<&str> {
        self.edges
            .iter()
            .filter(|e| !e.is_self_reference())
            .filter_map(|e| {
                if e.source_table == table {
                    Some(e.target_table.as_str())
                } else if e.target_table == table {
                    Some(e.source_table.as_str())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Edges touching `table`; a self reference is listed once
    pub fn edges_of(&self, table: &str) -> Vec<&RelationshipEdge> {
        self.edges.iter().filter(|e| e.touches(table)).collect()
    }

    /// Role of column `index` of `table`, or `None` if either is unknown
    pub fn column_role(&self, table: &str, index: usize) -> Option<ColumnRole> {
        self.node(table)
            .and_then(|n| n.columns.get(index))
            .map(ColumnSpec::role)
    }

    /// Total number of columns across all tables
    pub fn column_count(&self) -> usize {
        self.nodes.iter().map(|n| n.columns.len()).sum()
    }
}

fn build_node(snapshot: &SchemaSnapshot, table: &TableRecord, metrics: CardMetrics) -> TableNode {
    let columns = table
        .columns
        .iter()
        .map(|col| {
            let declared = table
                .foreign_keys
                .iter()
                .find(|fk| fk.from_column.eq_ignore_ascii_case(&col.name));
            ColumnSpec {
                name: col.name.clone(),
                declared_type: col.declared_type.clone(),
                is_primary_key: col.is_primary_key,
                is_foreign_key: declared.is_some(),
                foreign_ref: declared.map(|fk| ForeignRef {
                    table: fk.to_table.clone(),
                    column: snapshot
                        .target_column(fk)
                        .unwrap_or(fk.to_column.as_str())
                        .to_string(),
                }),
            }
        })
        .collect();

    TableNode {
        name: table.name.clone(),
        columns,
        width: metrics.width,
        header_height: metrics.header_height,
        row_height: metrics.row_height,
    }
}

/// Introspect a source and build its relationship graph in one step
pub fn build_graph<S: SchemaSource + ?Sized>(
    source: &S,
) -> Result<RelationshipGraph, SchemaAccessError> {
    let snapshot = introspect(source)?;
    Ok(RelationshipGraph::from_snapshot(&snapshot))
}
