//! Holder for the most recent valid relationship graph.

use crate::error::SchemaAccessError;
use crate::graph::{build_graph, RelationshipGraph};
use crate::introspect::SchemaSource;
use tracing::{debug, warn};

/// Keeps the last graph that was built successfully.
///
/// A failed reload returns the error and leaves the held graph untouched, so
/// callers can keep rendering a stale but valid diagram.
#[derive(Debug, Default)]
pub struct SchemaSession {
    graph: Option<RelationshipGraph>,
    reloads: usize,
}

impl SchemaSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Introspect `source` and replace the held graph on success
    pub fn reload<S: SchemaSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<&RelationshipGraph, SchemaAccessError> {
        match build_graph(source) {
            Ok(graph) => {
                self.reloads += 1;
                debug!(
                    tables = graph.len(),
                    edges = graph.edge_count(),
                    reloads = self.reloads,
                    "schema reloaded"
                );
                Ok(&*self.graph.insert(graph))
            }
            Err(e) => {
                warn!("schema reload failed, keeping previous graph: {}", e);
                Err(e)
            }
        }
    }

    /// The most recent valid graph, if any reload has succeeded
    pub fn graph(&self) -> Option<&RelationshipGraph> {
        self.graph.as_ref()
    }

    /// Number of successful reloads
    pub fn reload_count(&self) -> usize {
        self.reloads
    }
}
