//! Row-major grid placement.

use super::{GridConfig, PositionMap};
use crate::geometry::Point;
use crate::graph::RelationshipGraph;

/// Place nodes in declaration order on a grid of `floor(sqrt(n)) + 1`
/// columns. Edges are ignored.
pub fn grid_layout(graph: &RelationshipGraph, config: &GridConfig) -> PositionMap {
    let n = graph.len();
    let mut positions = PositionMap::with_capacity(n);
    if n == 0 {
        return positions;
    }

    let cols = (n as f64).sqrt().floor() as usize + 1;

    for (i, node) in graph.nodes().iter().enumerate() {
        let row = i / cols;
        let col = i % cols;
        positions.insert(
            node.name.clone(),
            Point::new(
                col as f64 * config.column_spacing + config.margin,
                row as f64 * config.row_spacing + config.margin,
            ),
        );
    }

    positions
}
