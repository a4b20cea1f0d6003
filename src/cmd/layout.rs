//! Layout command: compute positions and write the scene document.

use super::parse_kind;
use anyhow::{bail, Context, Result};
use schema_canvas::graph::view::{exclude_tables, filter_tables, focus_table, parse_patterns};
use schema_canvas::graph::RelationshipGraph;
use schema_canvas::introspect::load_snapshot;
use schema_canvas::layout::{Canvas, LayoutConfig, LayoutEngine, LayoutStrategy};
use schema_canvas::scene::to_json;
use std::fs;
use std::path::PathBuf;

/// Parsed layout command arguments
pub struct LayoutArgs {
    pub source: PathBuf,
    pub kind: Option<String>,
    pub strategy: String,
    pub seed: Option<u64>,
    pub iterations: Option<usize>,
    pub width: f64,
    pub height: f64,
    pub config: Option<PathBuf>,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub focus: Option<String>,
    pub depth: Option<usize>,
    pub output: Option<PathBuf>,
}

/// Run the layout command
pub fn run(args: LayoutArgs) -> Result<()> {
    let strategy: LayoutStrategy = args
        .strategy
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let kind = parse_kind(args.kind)?;

    if !(args.width > 0.0 && args.height > 0.0) {
        bail!(
            "canvas must have a positive size, got {}x{}",
            args.width,
            args.height
        );
    }
    let canvas = Canvas::new(args.width, args.height);

    let mut config = match args.config {
        Some(ref path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(iterations) = args.iterations {
        config.spring.iterations = iterations;
    }

    let snapshot = load_snapshot(&args.source, kind)
        .with_context(|| format!("Failed to introspect {}", args.source.display()))?;
    let mut graph = RelationshipGraph::from_snapshot(&snapshot);

    if let Some(ref tables) = args.tables {
        graph = filter_tables(&graph, &parse_patterns(tables));
    }
    if let Some(ref exclude) = args.exclude {
        graph = exclude_tables(&graph, &parse_patterns(exclude));
    }
    if let Some(ref table) = args.focus {
        if !graph.contains(table) {
            bail!("table '{}' not found in {}", table, args.source.display());
        }
        graph = focus_table(&graph, table, args.depth);
    }

    let layout = LayoutEngine::new(config).layout(&graph, strategy, canvas, args.seed);
    let output_content = to_json(&graph, &layout, canvas);

    if let Some(ref out_path) = args.output {
        fs::write(out_path, output_content.as_bytes())
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        eprintln!("Scene written to: {}", out_path.display());
    } else {
        println!("{}", output_content);
    }

    match layout.seed {
        Some(seed) => eprintln!(
            "Layout: {} tables, {} relationships [strategy: {}, seed: {}]",
            graph.len(),
            graph.edge_count(),
            strategy,
            seed
        ),
        None => eprintln!(
            "Layout: {} tables, {} relationships [strategy: {}]",
            graph.len(),
            graph.edge_count(),
            strategy
        ),
    }

    Ok(())
}
