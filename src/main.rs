//! tessera-insight CLI: knowledge-graph analytics over JSON snapshots.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use tessera_insight::error::SnapshotError;
use tessera_insight::graph::{metrics, Graph};
use tessera_insight::model::Snapshot;
use tessera_insight::report;

#[derive(Parser)]
#[command(name = "tessera-insight", version, about = "Knowledge-graph analytics core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline and print the report as JSON.
    Analyze {
        /// Path to a JSON snapshot file.
        #[arg(long)]
        file: PathBuf,

        /// Drop edges with weight below this threshold.
        #[arg(long)]
        min_relevance: Option<f64>,

        /// Restrict the graph to the neighborhood of this node.
        #[arg(long)]
        center_id: Option<String>,

        /// Maximum hops from the center node.
        #[arg(long)]
        max_depth: Option<usize>,

        /// Seed for the randomized algorithms (layout, sampling, tie-breaks).
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print only the structural graph metrics for a snapshot.
    GraphStats {
        /// Path to a JSON snapshot file.
        #[arg(long)]
        file: PathBuf,
    },
}

fn load_snapshot(path: &Path) -> std::result::Result<Snapshot, SnapshotError> {
    let content =
        std::fs::read_to_string(path).map_err(|source| SnapshotError::Io { source })?;
    Ok(serde_json::from_str(&content)?)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            min_relevance,
            center_id,
            max_depth,
            seed,
            pretty,
        } => {
            let mut snapshot = load_snapshot(&file)?;
            if let Some(min_relevance) = min_relevance {
                snapshot.options.min_relevance = min_relevance;
            }
            if center_id.is_some() {
                snapshot.options.center_id = center_id;
            }
            if max_depth.is_some() {
                snapshot.options.max_depth = max_depth;
            }
            if let Some(seed) = seed {
                snapshot.seed = seed;
            }

            let analysis = report::analyze(&snapshot)?;
            let json = if pretty {
                serde_json::to_string_pretty(&analysis).into_diagnostic()?
            } else {
                serde_json::to_string(&analysis).into_diagnostic()?
            };
            println!("{json}");
        }

        Commands::GraphStats { file } => {
            let snapshot = load_snapshot(&file)?;
            let graph = Graph::build(&snapshot.nodes, &snapshot.edges, &snapshot.options)?;
            let stats = metrics::compute(&graph);
            println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
        }
    }

    Ok(())
}
