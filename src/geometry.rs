//! Connector geometry between two column rows.
//!
//! An edge leaves the right border of the source card at the source column's
//! row centre and enters the left border of the target card at the target
//! column's row centre. The curve is a cubic Bézier whose control points keep
//! the tangent horizontal at both ends.

use crate::graph::{RelationshipEdge, RelationshipGraph, TableNode};
use crate::layout::PositionMap;
use schemars::JsonSchema;
use serde::Serialize;
use std::f64::consts::PI;

/// Fraction of the horizontal span where the first control point sits
pub const CTRL1_FRACTION: f64 = 0.4;
/// Fraction of the horizontal span where the second control point sits
pub const CTRL2_FRACTION: f64 = 0.6;
/// Length of each arrowhead wing
pub const ARROW_SIZE: f64 = 10.0;
/// Half-angle between the arrow shaft and each wing
pub const ARROW_ANGLE: f64 = PI / 6.0;
/// Padding around the start/end box
pub const BOUNDS_PADDING: f64 = 5.0;

/// A 2D point in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, JsonSchema)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Everything a renderer needs to draw one connector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct EdgeGeometry {
    pub start: Point,
    pub end: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    /// Direction of the curve at `end`, in radians
    pub angle: f64,
    pub arrow_wing1: Point,
    pub arrow_wing2: Point,
    /// Box around start/end with padding (not the full curve hull)
    pub bounds: Rect,
}

/// Anchor on the right border of `node` at the centre of row `index`
pub fn source_anchor(node: &TableNode, origin: Point, index: usize) -> Point {
    Point::new(origin.x + node.width, row_center(node, origin, index))
}

/// Anchor on the left border of `node` at the centre of row `index`
pub fn target_anchor(node: &TableNode, origin: Point, index: usize) -> Point {
    Point::new(origin.x, row_center(node, origin, index))
}

fn row_center(node: &TableNode, origin: Point, index: usize) -> f64 {
    origin.y + node.header_height + index as f64 * node.row_height + node.row_height / 2.0
}

/// Compute connector geometry from two anchors
pub fn connector(start: Point, end: Point) -> EdgeGeometry {
    let dx = end.x - start.x;
    let ctrl1 = Point::new(start.x + dx * CTRL1_FRACTION, start.y);
    let ctrl2 = Point::new(start.x + dx * CTRL2_FRACTION, end.y);

    let angle = (end.y - ctrl2.y).atan2(end.x - ctrl2.x);
    let arrow_wing1 = Point::new(
        end.x - ARROW_SIZE * (angle - ARROW_ANGLE).cos(),
        end.y - ARROW_SIZE * (angle - ARROW_ANGLE).sin(),
    );
    let arrow_wing2 = Point::new(
        end.x - ARROW_SIZE * (angle + ARROW_ANGLE).cos(),
        end.y - ARROW_SIZE * (angle + ARROW_ANGLE).sin(),
    );

    let bounds = Rect {
        x: start.x.min(end.x) - BOUNDS_PADDING,
        y: start.y.min(end.y) - BOUNDS_PADDING,
        width: (end.x - start.x).abs() + 2.0 * BOUNDS_PADDING,
        height: (end.y - start.y).abs() + 2.0 * BOUNDS_PADDING,
    };

    EdgeGeometry {
        start,
        end,
        ctrl1,
        ctrl2,
        angle,
        arrow_wing1,
        arrow_wing2,
        bounds,
    }
}

/// Geometry for one edge, or `None` if either table has no position
pub fn resolve_edge_geometry(
    graph: &RelationshipGraph,
    positions: &PositionMap,
    edge: &RelationshipEdge,
) -> Option<EdgeGeometry> {
    let source = graph.node(&edge.source_table)?;
    let target = graph.node(&edge.target_table)?;
    let source_origin = positions.get(&edge.source_table)?;
    let target_origin = positions.get(&edge.target_table)?;

    let start = source_anchor(source, source_origin, edge.source_column_index);
    let end = target_anchor(target, target_origin, edge.target_column_index);
    Some(connector(start, end))
}

/// Geometry for every edge in graph order; unresolvable edges are `None`
pub fn resolve_all(graph: &RelationshipGraph, positions: &PositionMap) -> Vec<Option<EdgeGeometry>> {
    graph
        .edges()
        .iter()
        .map(|edge| resolve_edge_geometry(graph, positions, edge))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_connector() {
        let geometry = connector(Point::new(0.0, 100.0), Point::new(200.0, 100.0));

        assert_eq!(geometry.ctrl1, Point::new(80.0, 100.0));
        assert_eq!(geometry.ctrl2, Point::new(120.0, 100.0));
        assert!(geometry.angle.abs() < 1e-12);
        // Wings trail behind the tip, one above and one below
        assert!(geometry.arrow_wing1.x < 200.0);
        assert!(geometry.arrow_wing2.x < 200.0);
        assert!((geometry.arrow_wing1.y - geometry.arrow_wing2.y).abs() > 9.0);
        assert_eq!(
            geometry.bounds,
            Rect {
                x: -5.0,
                y: 95.0,
                width: 210.0,
                height: 10.0
            }
        );
    }

    #[test]
    fn test_wings_are_arrow_size_from_tip() {
        let geometry = connector(Point::new(300.0, 50.0), Point::new(20.0, 400.0));
        assert!((geometry.arrow_wing1.distance(&geometry.end) - ARROW_SIZE).abs() < 1e-9);
        assert!((geometry.arrow_wing2.distance(&geometry.end) - ARROW_SIZE).abs() < 1e-9);
    }
}
