//! Subgraph selection by table-name patterns or by neighbourhood focus.
//!
//! Every function here returns a new [`RelationshipGraph`]; the source graph
//! is left untouched. Edges survive only when both endpoints are kept.

use super::RelationshipGraph;
use ahash::{AHashMap, AHashSet};
use glob::Pattern;
use std::collections::VecDeque;

/// Keep only tables matching any of the given patterns.
///
/// An empty pattern list keeps every table.
pub fn filter_tables(graph: &RelationshipGraph, patterns: &[Pattern]) -> RelationshipGraph {
    if patterns.is_empty() {
        return graph.clone();
    }

    let matching: AHashSet<&str> = graph
        .nodes()
        .iter()
        .map(|n| n.name.as_str())
        .filter(|name| patterns.iter().any(|p| p.matches(name)))
        .collect();

    retain_tables(graph, &matching)
}

/// Drop tables matching any of the given patterns
pub fn exclude_tables(graph: &RelationshipGraph, patterns: &[Pattern]) -> RelationshipGraph {
    if patterns.is_empty() {
        return graph.clone();
    }

    let remaining: AHashSet<&str> = graph
        .nodes()
        .iter()
        .map(|n| n.name.as_str())
        .filter(|name| !patterns.iter().any(|p| p.matches(name)))
        .collect();

    retain_tables(graph, &remaining)
}

/// Keep `table` and every table reachable from it within `max_depth` hops,
/// following foreign keys in both directions.
///
/// `None` means unbounded. An unknown table yields an empty graph.
pub fn focus_table(
    graph: &RelationshipGraph,
    table: &str,
    max_depth: Option<usize>,
) -> RelationshipGraph {
    let Some(start) = graph.node(table) else {
        return RelationshipGraph::from_parts(Vec::new(), Vec::new(), graph.warnings().to_vec());
    };

    let adjacency = build_adjacency(graph);
    let mut result: AHashSet<&str> = AHashSet::new();
    result.insert(start.name.as_str());

    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    queue.push_back((start.name.as_str(), 0));

    while let Some((current, depth)) = queue.pop_front() {
        if let Some(max) = max_depth {
            if depth >= max {
                continue;
            }
        }

        if let Some(neighbors) = adjacency.get(current) {
            for &neighbor in neighbors {
                if result.insert(neighbor) {
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }
    }

    retain_tables(graph, &result)
}

/// Parse comma-separated glob patterns, skipping invalid ones
pub fn parse_patterns(spec: &str) -> Vec<Pattern> {
    spec.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| Pattern::new(s).ok())
        .collect()
}

fn retain_tables(graph: &RelationshipGraph, keep: &AHashSet<&str>) -> RelationshipGraph {
    let nodes = graph
        .nodes()
        .iter()
        .filter(|n| keep.contains(n.name.as_str()))
        .cloned()
        .collect();
    let edges = graph
        .edges()
        .iter()
        .filter(|e| keep.contains(e.source_table.as_str()) && keep.contains(e.target_table.as_str()))
        .cloned()
        .collect();

    RelationshipGraph::from_parts(nodes, edges, graph.warnings().to_vec())
}

/// Undirected adjacency over table names
fn build_adjacency(graph: &RelationshipGraph) -> AHashMap<&str, Vec<&str>> {
    let mut adjacency: AHashMap<&str, Vec<&str>> = AHashMap::new();

    for edge in graph.edges() {
        adjacency
            .entry(edge.source_table.as_str())
            .or_default()
            .push(edge.target_table.as_str());
        adjacency
            .entry(edge.target_table.as_str())
            .or_default()
            .push(edge.source_table.as_str());
    }

    adjacency
}
