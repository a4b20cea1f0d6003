//! Tables command: schema listing with roles and reverse references.

use super::parse_kind;
use anyhow::{Context, Result};
use schema_canvas::graph::RelationshipGraph;
use schema_canvas::introspect::load_snapshot;
use schema_canvas::report::{build_tables_report, TablesReport};
use schema_canvas::scene::ColumnRoleJson;
use std::path::PathBuf;

/// Run the tables command
pub fn run(source: PathBuf, kind: Option<String>, json: bool) -> Result<()> {
    let kind = parse_kind(kind)?;
    let snapshot = load_snapshot(&source, kind)
        .with_context(|| format!("Failed to introspect {}", source.display()))?;
    let graph = RelationshipGraph::from_snapshot(&snapshot);
    let report = build_tables_report(&snapshot, &graph);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &TablesReport) {
    if report.tables.is_empty() {
        println!("No tables found.");
        return;
    }

    for table in &report.tables {
        println!("{}", table.name);
        for col in &table.columns {
            let marker = match col.role {
                ColumnRoleJson::PrimaryKey => "PK",
                ColumnRoleJson::ForeignKey => "FK",
                ColumnRoleJson::Plain => "  ",
            };
            match &col.references {
                Some(target) => println!("  {} {} {} -> {}", marker, col.name, col.col_type, target),
                None => println!("  {} {} {}", marker, col.name, col.col_type),
            }
        }
        for (column, referrers) in &table.referenced_by {
            println!("  <- {} referenced by {}", column, referrers.join(", "));
        }
        println!();
    }

    eprintln!(
        "{} tables, {} columns, {} relationships",
        report.stats.table_count, report.stats.column_count, report.stats.relationship_count
    );
}
