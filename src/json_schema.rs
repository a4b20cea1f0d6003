//! JSON Schema generation for CLI output types.
//!
//! Every command that prints JSON has a schema here; the `schema` subcommand
//! exports them.

use schemars::{schema_for, Schema};
use std::collections::BTreeMap;

/// Returns all JSON schemas for commands that support JSON output.
/// Uses BTreeMap for deterministic ordering.
pub fn all_schemas() -> BTreeMap<&'static str, Schema> {
    let mut schemas = BTreeMap::new();

    // layout command (scene document)
    schemas.insert("layout", schema_for!(crate::scene::SceneJson));

    // preview command
    schemas.insert("preview", schema_for!(crate::report::PreviewReport));

    // tables command
    schemas.insert("tables", schema_for!(crate::report::TablesReport));

    schemas
}

/// Generate a single schema by command name.
pub fn get_schema(command: &str) -> Option<Schema> {
    all_schemas().remove(command)
}

/// List all available schema names.
pub fn schema_names() -> Vec<&'static str> {
    all_schemas().keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names() {
        assert_eq!(schema_names(), vec!["layout", "preview", "tables"]);
        assert!(get_schema("tables").is_some());
        assert!(get_schema("completions").is_none());
    }
}
