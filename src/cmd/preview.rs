//! Preview command: first rows of one table.

use super::parse_kind;
use anyhow::{bail, Context, Result};
use schema_canvas::introspect::{preview_rows, SourceKind};
use schema_canvas::report::{render_text_table, PreviewReport};
use std::path::PathBuf;

/// Run the preview command
pub fn run(
    source: PathBuf,
    kind: Option<String>,
    table: String,
    limit: usize,
    json: bool,
) -> Result<()> {
    let kind = parse_kind(kind)?.unwrap_or_else(|| SourceKind::from_path(&source));
    if !kind.is_database() {
        bail!(
            "preview needs a database file, got a schema script: {}",
            source.display()
        );
    }

    let preview = preview_rows(&source, Some(kind), &table, limit)
        .with_context(|| format!("Failed to preview table '{}' in {}", table, source.display()))?;

    if json {
        let report = PreviewReport::new(table, limit, preview);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if preview.is_empty() {
        eprintln!("Table '{}' has no rows.", table);
    }
    print!("{}", render_text_table(&preview.columns, &preview.rows));
    eprintln!("{} rows", preview.row_count());

    Ok(())
}
