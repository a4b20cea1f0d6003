//! Schema command: JSON Schemas of the JSON outputs.

use anyhow::{bail, Result};
use schema_canvas::json_schema::{all_schemas, get_schema, schema_names};
use std::fs;
use std::path::PathBuf;

/// Run the schema command
pub fn run(command: Option<String>, output_dir: Option<PathBuf>) -> Result<()> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(&dir)?;
        for (name, schema) in all_schemas() {
            let path = dir.join(format!("{}.schema.json", name));
            fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
            eprintln!("Wrote {}", path.display());
        }
        return Ok(());
    }

    match command {
        Some(name) => match get_schema(&name) {
            Some(schema) => println!("{}", serde_json::to_string_pretty(&schema)?),
            None => bail!(
                "Unknown command '{}'. Available: {}",
                name,
                schema_names().join(", ")
            ),
        },
        None => {
            let schemas = all_schemas();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
    }

    Ok(())
}
