//! Error types surfaced at the library boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to read schema metadata from a relational store.
///
/// Introspection is all-or-nothing: when this error is returned no partial
/// snapshot escapes, and a [`crate::session::SchemaSession`] keeps whatever
/// graph it held before the attempt.
#[derive(Debug, Error)]
pub enum SchemaAccessError {
    /// The store could not be opened (missing file, not a database, ...)
    #[error("cannot open schema store {path}: {reason}")]
    Open { path: PathBuf, reason: String },

    /// The store is held by another process
    #[error("schema store {path} is locked: {reason}")]
    Locked { path: PathBuf, reason: String },

    /// An introspection query failed
    #[error("introspection query failed for {target}: {reason}")]
    Query { target: String, reason: String },

    /// A schema script could not be read
    #[error("failed to read schema script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaAccessError {
    pub(crate) fn query(target: impl Into<String>, err: impl std::fmt::Display) -> Self {
        SchemaAccessError::Query {
            target: target.into(),
            reason: err.to_string(),
        }
    }
}
