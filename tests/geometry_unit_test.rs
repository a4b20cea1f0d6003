//! Unit tests for connector anchors, control points and arrowheads.

use schema_canvas::geometry::{resolve_all, source_anchor, target_anchor, Rect};
use schema_canvas::layout::PositionMap;
use schema_canvas::schema::parse_script;
use schema_canvas::{resolve_edge_geometry, Point, RelationshipGraph};
use std::f64::consts::PI;

fn users_orders() -> RelationshipGraph {
    RelationshipGraph::from_snapshot(&parse_script(
        "CREATE TABLE users (id INT PRIMARY KEY, name TEXT);
         CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));",
    ))
}

fn placed(orders: Point, users: Point) -> PositionMap {
    let mut positions = PositionMap::new();
    positions.insert("orders", orders);
    positions.insert("users", users);
    positions
}

#[test]
fn test_source_anchor_row_offset() {
    let graph = users_orders();
    let orders = graph.node("orders").unwrap();

    let anchor = source_anchor(orders, Point::new(10.0, 20.0), 1);
    assert_eq!(anchor, Point::new(250.0, 20.0 + 82.0));
}

#[test]
fn test_target_anchor_on_left_border() {
    let graph = users_orders();
    let users = graph.node("users").unwrap();

    let anchor = target_anchor(users, Point::new(600.0, 0.0), 0);
    assert_eq!(anchor, Point::new(600.0, 54.0));
}

#[test]
fn test_resolve_edge_geometry() {
    let graph = users_orders();
    let positions = placed(Point::new(0.0, 0.0), Point::new(640.0, 100.0));
    let edge = &graph.edges()[0];

    let g = resolve_edge_geometry(&graph, &positions, edge).unwrap();

    assert_eq!(g.start, Point::new(240.0, 82.0));
    assert_eq!(g.end, Point::new(640.0, 154.0));
    assert_eq!(g.ctrl1, Point::new(400.0, 82.0));
    assert_eq!(g.ctrl2, Point::new(480.0, 154.0));
    // Curve arrives horizontally
    assert!(g.angle.abs() < 1e-12);
    assert!((g.arrow_wing1.x - (640.0 - 10.0 * (PI / 6.0).cos())).abs() < 1e-9);
    assert!((g.arrow_wing1.y - (154.0 + 5.0)).abs() < 1e-9);
    assert!((g.arrow_wing2.y - (154.0 - 5.0)).abs() < 1e-9);
    assert_eq!(
        g.bounds,
        Rect {
            x: 235.0,
            y: 77.0,
            width: 410.0,
            height: 82.0
        }
    );
}

#[test]
fn test_backward_edge_points_left() {
    let graph = users_orders();
    // Target left of the source: the curve doubles back
    let positions = placed(Point::new(600.0, 0.0), Point::new(0.0, 0.0));
    let g = resolve_edge_geometry(&graph, &positions, &graph.edges()[0]).unwrap();

    assert_eq!(g.start.x, 840.0);
    assert_eq!(g.end.x, 0.0);
    assert!(g.ctrl1.x < g.start.x);
    assert!((g.angle.abs() - PI).abs() < 1e-12);
    assert!(g.arrow_wing1.x > g.end.x);
    assert_eq!(g.bounds.x, -5.0);
    assert_eq!(g.bounds.width, 850.0);
}

#[test]
fn test_missing_position_yields_none() {
    let graph = users_orders();
    let mut positions = PositionMap::new();
    positions.insert("orders", Point::new(0.0, 0.0));

    assert!(resolve_edge_geometry(&graph, &positions, &graph.edges()[0]).is_none());
    assert_eq!(resolve_all(&graph, &positions), vec![None]);
}

#[test]
fn test_resolve_all_in_edge_order() {
    let graph = RelationshipGraph::from_snapshot(&parse_script(
        "CREATE TABLE users (id INT PRIMARY KEY);
         CREATE TABLE messages (
           id INT PRIMARY KEY,
           sender_id INT REFERENCES users(id),
           recipient_id INT REFERENCES users(id)
         );",
    ));
    let mut positions = PositionMap::new();
    positions.insert("users", Point::new(500.0, 0.0));
    positions.insert("messages", Point::new(0.0, 0.0));

    let all = resolve_all(&graph, &positions);
    assert_eq!(all.len(), 2);
    let first = all[0].unwrap();
    let second = all[1].unwrap();
    assert_eq!(first.start.y, 40.0 + 28.0 + 14.0);
    assert_eq!(second.start.y, 40.0 + 56.0 + 14.0);
    assert_eq!(first.end, second.end);
}
