//! Synthetic schema generator for schema-canvas tests and benchmarks.
//!
//! Generates deterministic schemas with foreign keys between tables and
//! renders them as SQL DDL (optionally with rows).
//!
//! # Example
//!
//! ```rust
//! use schema_gen::{Generator, Scale};
//!
//! let schema = Generator::new(42, Scale::Small).generate();
//! let sql = schema.to_ddl();
//!
//! assert!(sql.contains("CREATE TABLE"));
//! ```

pub mod generator;
pub mod schema;

pub use generator::{GenConfig, Generator, Scale};
pub use schema::{Column, ForeignKey, Schema, SqlType, Table};
