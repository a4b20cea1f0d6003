//! CLI for generating synthetic schemas.
//!
//! Usage:
//!   gen-schema --scale small --seed 42 > schema.sql
//!   gen-schema --tables 25 --rows 10 -o demo.sql

use clap::Parser;
use schema_gen::{GenConfig, Generator, Scale};
use std::fs;

#[derive(Parser, Debug)]
#[command(name = "gen-schema")]
#[command(about = "Generate synthetic SQL schemas for schema-canvas", long_about = None)]
struct Args {
    /// Scale preset: small, medium, large
    /// Ignored if --tables is specified
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Number of tables (overrides --scale)
    #[arg(long)]
    tables: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Rows per table (0 = schema only)
    #[arg(long, default_value = "0")]
    rows: usize,

    /// Probability that a table gets a foreign key to a missing table
    #[arg(long, default_value = "0")]
    dangling: f64,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let scale: Scale = args.scale.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let mut config = GenConfig::for_scale(scale);
    if let Some(tables) = args.tables {
        config.tables = tables;
    }
    config.dangling_probability = args.dangling;

    let schema = Generator::with_config(args.seed, config).generate();
    let sql = schema.to_sql_with_rows(args.rows);

    if let Some(ref path) = args.output {
        fs::write(path, sql)?;
        eprintln!(
            "Generated {} tables ({} foreign keys) to {}",
            schema.tables.len(),
            schema.resolvable_fk_count(),
            path
        );
    } else {
        print!("{}", sql);
    }

    Ok(())
}
