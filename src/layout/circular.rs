//! Placement on a circle around a fixed centre.

use super::{CircularConfig, PositionMap};
use crate::geometry::Point;
use crate::graph::RelationshipGraph;
use std::f64::consts::TAU;

/// Radius used for `n` nodes
pub fn circle_radius(config: &CircularConfig, n: usize) -> f64 {
    config.max_radius.min(config.radius_per_node * n as f64)
}

/// Centre of node `i` of `n` on the circle, before the card offset
pub fn circle_point(config: &CircularConfig, i: usize, n: usize) -> Point {
    let radius = circle_radius(config, n);
    let angle = i as f64 * TAU / n as f64;
    Point::new(
        config.center_x + radius * angle.cos(),
        config.center_y + radius * angle.sin(),
    )
}

/// Space nodes evenly by angle in declaration order, starting at angle 0.
/// Each card is centred on its circle point.
pub fn circular_layout(graph: &RelationshipGraph, config: &CircularConfig) -> PositionMap {
    let n = graph.len();
    let mut positions = PositionMap::with_capacity(n);
    if n == 0 {
        return positions;
    }

    for (i, node) in graph.nodes().iter().enumerate() {
        let center = circle_point(config, i, n);
        positions.insert(
            node.name.clone(),
            Point::new(center.x - node.width / 2.0, center.y - node.height() / 2.0),
        );
    }

    positions
}
