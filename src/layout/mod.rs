//! Node placement for relationship graphs.
//!
//! Supports three strategies:
//! - **Grid**: row-major grid in declaration order, ignores edges
//! - **Circular**: nodes evenly spaced on a circle
//! - **Spring**: force-directed relaxation with a fixed iteration budget
//!
//! A layout never mutates the graph; it returns a fresh [`PositionMap`] of
//! card top-left corners keyed by table name.

mod circular;
mod grid;
mod spring;

pub use circular::circular_layout;
pub use grid::grid_layout;
pub use spring::SpringSimulation;

use crate::geometry::Point;
use crate::graph::RelationshipGraph;
use ahash::AHashMap;
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Layout strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LayoutStrategy {
    /// Row-major grid (default)
    #[default]
    Grid,
    /// Evenly spaced on a circle
    Circular,
    /// Force-directed
    Spring,
}

impl FromStr for LayoutStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grid" => Ok(LayoutStrategy::Grid),
            "circular" | "circle" => Ok(LayoutStrategy::Circular),
            "spring" | "force" => Ok(LayoutStrategy::Spring),
            _ => Err(format!(
                "Unknown layout strategy: {}. Valid options: grid, circular, spring",
                s
            )),
        }
    }
}

impl fmt::Display for LayoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutStrategy::Grid => write!(f, "grid"),
            LayoutStrategy::Circular => write!(f, "circular"),
            LayoutStrategy::Spring => write!(f, "spring"),
        }
    }
}

/// Drawing area; bounds the Spring initialization box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 800.0,
        }
    }
}

/// Top-left corner of every placed card, keyed by table name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionMap {
    positions: AHashMap<String, Point>,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: AHashMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, table: impl Into<String>, position: Point) {
        self.positions.insert(table.into(), position);
    }

    pub fn get(&self, table: &str) -> Option<Point> {
        self.positions.get(table).copied()
    }

    pub fn contains(&self, table: &str) -> bool {
        self.positions.contains_key(table)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Grid spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub column_spacing: f64,
    pub row_spacing: f64,
    pub margin: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            column_spacing: 250.0,
            row_spacing: 300.0,
            margin: 50.0,
        }
    }
}

/// Circle placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircularConfig {
    pub center_x: f64,
    pub center_y: f64,
    /// Upper bound on the radius
    pub max_radius: f64,
    /// Radius grows by this much per node until `max_radius`
    pub radius_per_node: f64,
}

impl Default for CircularConfig {
    fn default() -> Self {
        Self {
            center_x: 600.0,
            center_y: 400.0,
            max_radius: 300.0,
            radius_per_node: 100.0,
        }
    }
}

/// Force-directed relaxation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Fixed iteration budget; there is no convergence check
    pub iterations: usize,
    /// Ideal edge length
    pub k: f64,
    /// Fraction of the net force applied per iteration
    pub damping: f64,
    /// Distances below this are clamped
    pub min_distance: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            iterations: 50,
            k: 300.0,
            damping: 0.1,
            min_distance: 1.0,
        }
    }
}

/// Tunable constants of every strategy, loadable from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub grid: GridConfig,
    pub circular: CircularConfig,
    pub spring: SpringConfig,
}

impl LayoutConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid layout config: {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: LayoutConfig = serde_yaml_ng::from_str(yaml)?;
        if config.spring.k <= 0.0 {
            anyhow::bail!("spring.k must be positive, got {}", config.spring.k);
        }
        if config.spring.min_distance <= 0.0 {
            anyhow::bail!(
                "spring.min_distance must be positive, got {}",
                config.spring.min_distance
            );
        }
        Ok(config)
    }
}

/// Result of one layout run
#[derive(Debug, Clone)]
pub struct Layout {
    pub strategy: LayoutStrategy,
    pub positions: PositionMap,
    /// Seed actually used (Spring only)
    pub seed: Option<u64>,
}

/// Dispatches a strategy over a graph with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Place every node of `graph`.
    ///
    /// Spring without a seed draws one at random; the drawn seed is reported
    /// in [`Layout::seed`] so the run can be reproduced.
    pub fn layout(
        &self,
        graph: &RelationshipGraph,
        strategy: LayoutStrategy,
        canvas: Canvas,
        seed: Option<u64>,
    ) -> Layout {
        let (positions, seed) = match strategy {
            LayoutStrategy::Grid => (grid_layout(graph, &self.config.grid), None),
            LayoutStrategy::Circular => (circular_layout(graph, &self.config.circular), None),
            LayoutStrategy::Spring => {
                let seed = seed.unwrap_or_else(rand::random);
                let positions =
                    SpringSimulation::new(graph, &self.config.spring, canvas, seed).run();
                (positions, Some(seed))
            }
        };

        debug!(
            strategy = %strategy,
            nodes = positions.len(),
            seed = ?seed,
            "layout computed"
        );

        Layout {
            strategy,
            positions,
            seed,
        }
    }
}

/// Compute positions with the default constants
pub fn compute_layout(
    graph: &RelationshipGraph,
    strategy: LayoutStrategy,
    canvas: Canvas,
    seed: Option<u64>,
) -> PositionMap {
    LayoutEngine::default()
        .layout(graph, strategy, canvas, seed)
        .positions
}
