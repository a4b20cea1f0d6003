//! Relational schema introspection, foreign-key relationship graphs and
//! diagram layout geometry.

pub mod error;
pub mod geometry;
pub mod graph;
pub mod introspect;
pub mod json_schema;
pub mod layout;
pub mod report;
pub mod scene;
pub mod schema;
pub mod session;

pub use error::SchemaAccessError;
pub use geometry::{resolve_edge_geometry, EdgeGeometry, Point, Rect};
pub use graph::{build_graph, ColumnRole, GraphWarning, RelationshipEdge, RelationshipGraph};
pub use layout::{compute_layout, Canvas, LayoutStrategy, PositionMap};
pub use session::SchemaSession;
