//! Scene document: graph, positions and connector geometry as JSON.
//!
//! The document is what an external renderer consumes; it carries no
//! styling, only coordinates and column roles.

use crate::geometry::{resolve_edge_geometry, EdgeGeometry};
use crate::graph::{ColumnRole, RelationshipGraph};
use crate::layout::{Canvas, Layout, LayoutStrategy};
use schemars::JsonSchema;
use serde::Serialize;

/// JSON representation of a laid-out diagram
#[derive(Debug, Serialize, JsonSchema)]
pub struct SceneJson {
    pub strategy: LayoutStrategy,
    /// Seed used by the spring layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub canvas: Canvas,
    pub tables: Vec<TableJson>,
    pub relationships: Vec<RelationshipJson>,
    pub warnings: Vec<String>,
    pub stats: SceneStats,
}

/// JSON representation of a placed table card
#[derive(Debug, Serialize, JsonSchema)]
pub struct TableJson {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub row_height: f64,
    pub columns: Vec<ColumnJson>,
}

/// JSON representation of a column row
#[derive(Debug, Serialize, JsonSchema)]
pub struct ColumnJson {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: String,
    pub role: ColumnRoleJson,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
}

/// Column highlighting role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRoleJson {
    Plain,
    PrimaryKey,
    ForeignKey,
}

impl From<ColumnRole> for ColumnRoleJson {
    fn from(role: ColumnRole) -> Self {
        match role {
            ColumnRole::Plain => ColumnRoleJson::Plain,
            ColumnRole::PrimaryKey => ColumnRoleJson::PrimaryKey,
            ColumnRole::ForeignKey => ColumnRoleJson::ForeignKey,
        }
    }
}

/// JSON representation of a relationship with its connector
#[derive(Debug, Serialize, JsonSchema)]
pub struct RelationshipJson {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub geometry: EdgeGeometry,
}

/// Scene statistics
#[derive(Debug, Serialize, JsonSchema)]
pub struct SceneStats {
    pub table_count: usize,
    pub column_count: usize,
    pub relationship_count: usize,
}

/// Build the scene structure.
///
/// Tables without a position are left out, as are edges touching them.
pub fn build_scene(graph: &RelationshipGraph, layout: &Layout, canvas: Canvas) -> SceneJson {
    let tables: Vec<TableJson> = graph
        .nodes()
        .iter()
        .filter_map(|node| {
            let origin = layout.positions.get(&node.name)?;
            let columns = node
                .columns
                .iter()
                .map(|col| ColumnJson {
                    name: col.name.clone(),
                    col_type: col.declared_type.clone(),
                    role: col.role().into(),
                    references_table: col.foreign_ref.as_ref().map(|r| r.table.clone()),
                    references_column: col.foreign_ref.as_ref().map(|r| r.column.clone()),
                })
                .collect();

            Some(TableJson {
                name: node.name.clone(),
                x: origin.x,
                y: origin.y,
                width: node.width,
                height: node.height(),
                header_height: node.header_height,
                row_height: node.row_height,
                columns,
            })
        })
        .collect();

    let relationships: Vec<RelationshipJson> = graph
        .edges()
        .iter()
        .filter_map(|edge| {
            let geometry = resolve_edge_geometry(graph, &layout.positions, edge)?;
            let source = graph.node(&edge.source_table)?;
            let target = graph.node(&edge.target_table)?;
            Some(RelationshipJson {
                from_table: edge.source_table.clone(),
                from_column: source.columns.get(edge.source_column_index)?.name.clone(),
                to_table: edge.target_table.clone(),
                to_column: target.columns.get(edge.target_column_index)?.name.clone(),
                geometry,
            })
        })
        .collect();

    let stats = SceneStats {
        table_count: tables.len(),
        column_count: tables.iter().map(|t| t.columns.len()).sum(),
        relationship_count: relationships.len(),
    };

    SceneJson {
        strategy: layout.strategy,
        seed: layout.seed,
        canvas,
        tables,
        relationships,
        warnings: graph.warnings().iter().map(|w| w.to_string()).collect(),
        stats,
    }
}

/// Generate pretty JSON for a laid-out graph
pub fn to_json(graph: &RelationshipGraph, layout: &Layout, canvas: Canvas) -> String {
    let scene = build_scene(graph, layout, canvas);
    serde_json::to_string_pretty(&scene).unwrap_or_else(|_| "{}".to_string())
}
