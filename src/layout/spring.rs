//! Force-directed placement.
//!
//! Every pair of nodes repels with `k² / d`; every edge pulls its endpoints
//! together with `d² / k`. Forces for one iteration are all computed from the
//! previous iteration's positions and applied together, scaled by the damping
//! factor.

use super::{Canvas, PositionMap, SpringConfig};
use crate::geometry::Point;
use crate::graph::RelationshipGraph;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Resumable spring relaxation over one graph.
///
/// The caller may stop after any [`step`](Self::step) and read the current
/// positions; [`run`](Self::run) steps until the iteration budget is spent.
#[derive(Debug, Clone)]
pub struct SpringSimulation {
    names: Vec<String>,
    positions: Vec<Point>,
    /// Other endpoint of every incident edge, per node (with multiplicity)
    incident: Vec<Vec<usize>>,
    config: SpringConfig,
    iteration: usize,
}

impl SpringSimulation {
    /// Seed initial positions uniformly in the canvas, drawing x then y for
    /// each node in graph order.
    pub fn new(graph: &RelationshipGraph, config: &SpringConfig, canvas: Canvas, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = graph.len();

        let mut names = Vec::with_capacity(n);
        let mut positions = Vec::with_capacity(n);
        for node in graph.nodes() {
            let x: f64 = StandardUniform.sample(&mut rng);
            let y: f64 = StandardUniform.sample(&mut rng);
            names.push(node.name.clone());
            positions.push(Point::new(x * canvas.width, y * canvas.height));
        }

        let mut incident = vec![Vec::new(); n];
        for edge in graph.edges() {
            let (Some(a), Some(b)) = (
                graph.node_index(&edge.source_table),
                graph.node_index(&edge.target_table),
            ) else {
                continue;
            };
            incident[a].push(b);
            if a != b {
                incident[b].push(a);
            }
        }

        Self {
            names,
            positions,
            incident,
            config: config.clone(),
            iteration: 0,
        }
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Whether the iteration budget is spent
    pub fn is_finished(&self) -> bool {
        self.iteration >= self.config.iterations
    }

    /// Advance one iteration
    pub fn step(&mut self) {
        let k = self.config.k;
        let k_squared = k * k;
        let min_distance = self.config.min_distance;
        let damping = self.config.damping;

        let next: Vec<Point> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut fx = 0.0;
                let mut fy = 0.0;

                for (j, q) in self.positions.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let dx = p.x - q.x;
                    let dy = p.y - q.y;
                    let dist = dx.hypot(dy).max(min_distance);
                    let force = k_squared / dist;
                    fx += (dx / dist) * force;
                    fy += (dy / dist) * force;
                }

                for &j in &self.incident[i] {
                    let q = self.positions[j];
                    let dx = p.x - q.x;
                    let dy = p.y - q.y;
                    let dist = dx.hypot(dy).max(min_distance);
                    let force = dist * dist / k;
                    fx -= (dx / dist) * force;
                    fy -= (dy / dist) * force;
                }

                Point::new(p.x + fx * damping, p.y + fy * damping)
            })
            .collect();

        self.positions = next;
        self.iteration += 1;
    }

    /// Current positions
    pub fn positions(&self) -> PositionMap {
        let mut map = PositionMap::with_capacity(self.names.len());
        for (name, &p) in self.names.iter().zip(&self.positions) {
            map.insert(name.clone(), p);
        }
        map
    }

    /// Step until the budget is spent and return the final positions
    pub fn run(mut self) -> PositionMap {
        while !self.is_finished() {
            self.step();
        }
        self.positions()
    }
}
