//! Tabular reports of a schema: table listing and row preview.

use crate::graph::RelationshipGraph;
use crate::introspect::RowPreview;
use crate::scene::ColumnRoleJson;
use crate::schema::SchemaSnapshot;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON output of the `tables` command
#[derive(Debug, Serialize, JsonSchema)]
pub struct TablesReport {
    pub tables: Vec<TableReport>,
    pub warnings: Vec<String>,
    pub stats: TablesStats,
}

/// One table with its columns and reverse references
#[derive(Debug, Serialize, JsonSchema)]
pub struct TableReport {
    pub name: String,
    pub columns: Vec<ColumnReport>,
    /// Referenced column -> tables declaring a foreign key onto it
    pub referenced_by: BTreeMap<String, Vec<String>>,
    /// Tables connected by a surviving foreign key, either direction
    pub neighbors: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ColumnReport {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    pub role: ColumnRoleJson,
    /// Declared target as `table.column`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct TablesStats {
    pub table_count: usize,
    pub column_count: usize,
    pub relationship_count: usize,
    pub warning_count: usize,
}

/// Build the table listing for a snapshot and the graph built from it
pub fn build_tables_report(snapshot: &SchemaSnapshot, graph: &RelationshipGraph) -> TablesReport {
    let tables = graph
        .nodes()
        .iter()
        .map(|node| TableReport {
            name: node.name.clone(),
            columns: node
                .columns
                .iter()
                .map(|col| ColumnReport {
                    name: col.name.clone(),
                    col_type: col.declared_type.clone(),
                    role: col.role().into(),
                    references: col
                        .foreign_ref
                        .as_ref()
                        .map(|r| format!("{}.{}", r.table, r.column)),
                })
                .collect(),
            referenced_by: snapshot.referenced_by(&node.name),
            neighbors: graph
                .neighbors(&node.name)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();

    TablesReport {
        tables,
        warnings: graph.warnings().iter().map(|w| w.to_string()).collect(),
        stats: TablesStats {
            table_count: graph.len(),
            column_count: graph.column_count(),
            relationship_count: graph.edge_count(),
            warning_count: graph.warnings().len(),
        },
    }
}

/// JSON output of the `preview` command
#[derive(Debug, Serialize, JsonSchema)]
pub struct PreviewReport {
    pub table: String,
    pub limit: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PreviewReport {
    pub fn new(table: impl Into<String>, limit: usize, preview: RowPreview) -> Self {
        Self {
            table: table.into(),
            limit,
            columns: preview.columns,
            rows: preview.rows,
        }
    }
}

/// Render rows as a plain aligned text table
pub fn render_text_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    let format_row = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{:<width$}", v, width = w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row.as_slice()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_script;

    #[test]
    fn test_tables_report_reverse_index() {
        let snapshot = parse_script(
            "CREATE TABLE users (id INT PRIMARY KEY, manager_id INT REFERENCES users(id));
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));
             CREATE TABLE reviews (id INT PRIMARY KEY, author_id INT REFERENCES users(id));",
        );
        let graph = RelationshipGraph::from_snapshot(&snapshot);
        let report = build_tables_report(&snapshot, &graph);

        let users = &report.tables[0];
        assert_eq!(users.referenced_by["id"], vec!["orders", "reviews"]);
        assert_eq!(users.neighbors, vec!["orders", "reviews"]);
        assert_eq!(users.columns[1].references.as_deref(), Some("users.id"));
        assert_eq!(report.stats.relationship_count, 3);
    }

    #[test]
    fn test_render_text_table() {
        let columns = vec!["id".to_string(), "name".to_string()];
        let rows = vec![vec!["1".to_string(), "alice".to_string()]];
        let text = render_text_table(&columns, &rows);

        assert_eq!(text, "id | name\n---+------\n1  | alice\n");
    }
}
