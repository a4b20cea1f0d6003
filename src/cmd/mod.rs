mod layout;
mod preview;
mod schema;
mod tables;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "schema-canvas")]
#[command(author = "Helge Sverre <helge.sverre@gmail.com>")]
#[command(version)]
#[command(
    about = "Inspect relational schemas and lay out their foreign-key relationships",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tables, columns, foreign keys and reverse references
    Tables {
        /// DuckDB or SQLite database file, or SQL schema script
        source: PathBuf,

        /// Source kind: duckdb, sqlite or sql (detected from the file if not specified)
        #[arg(short, long)]
        kind: Option<String>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute a diagram layout and write the JSON scene document
    Layout {
        /// DuckDB or SQLite database file, or SQL schema script
        source: PathBuf,

        /// Source kind: duckdb, sqlite or sql (detected from the file if not specified)
        #[arg(short, long)]
        kind: Option<String>,

        /// Layout strategy: grid, circular, or spring
        #[arg(short, long, default_value = "grid")]
        strategy: String,

        /// Random seed for the spring layout (drawn at random if not specified)
        #[arg(long)]
        seed: Option<u64>,

        /// Spring iteration budget (overrides the config file)
        #[arg(long)]
        iterations: Option<usize>,

        /// Canvas width
        #[arg(long, default_value_t = 1000.0)]
        width: f64,

        /// Canvas height
        #[arg(long, default_value_t = 800.0)]
        height: f64,

        /// YAML file with layout constants
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only include tables matching these glob patterns (comma-separated)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude tables matching these glob patterns (comma-separated)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Focus on one table and its neighbourhood
        #[arg(long)]
        focus: Option<String>,

        /// Maximum hops from the focused table
        #[arg(long, requires = "focus")]
        depth: Option<usize>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the first rows of a table (database sources only)
    Preview {
        /// DuckDB or SQLite database file
        source: PathBuf,

        /// Source kind: duckdb or sqlite (detected from the file if not specified)
        #[arg(short, long)]
        kind: Option<String>,

        /// Table to preview
        table: String,

        /// Maximum number of rows
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print JSON Schemas for the JSON outputs
    Schema {
        /// Only print the schema of this command
        #[arg(long)]
        command: Option<String>,

        /// Write one schema file per command into this directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Tables { source, kind, json } => tables::run(source, kind, json),
        Commands::Layout {
            source,
            kind,
            strategy,
            seed,
            iterations,
            width,
            height,
            config,
            tables,
            exclude,
            focus,
            depth,
            output,
        } => layout::run(layout::LayoutArgs {
            source,
            kind,
            strategy,
            seed,
            iterations,
            width,
            height,
            config,
            tables,
            exclude,
            focus,
            depth,
            output,
        }),
        Commands::Preview {
            source,
            kind,
            table,
            limit,
            json,
        } => preview::run(source, kind, table, limit, json),
        Commands::Schema {
            command,
            output_dir,
        } => schema::run(command, output_dir),
        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "schema-canvas",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}

/// Parse an optional source kind flag
fn parse_kind(kind: Option<String>) -> anyhow::Result<Option<schema_canvas::introspect::SourceKind>> {
    kind.map(|k| k.parse())
        .transpose()
        .map_err(|e| anyhow::anyhow!("{}", e))
}
