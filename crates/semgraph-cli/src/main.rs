//! Semgraph CLI - Command-line interface for Semgraph
//!
//! Imports knowledge graph exports into a local store and runs the
//! analytics over them: centrality, structural holes, knowledge gaps,
//! linking distance, and drift against a saved baseline.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "semgraph")]
#[command(author = "Semgraph Contributors")]
#[command(version)]
#[command(about = "Semantic knowledge graph analytics", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Store directory (defaults to .semgraph/store)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Semgraph in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Import a JSON graph export into the store
    Import {
        /// JSON file produced by `export` or by the host application
        file: PathBuf,

        /// Map ID to store the graph under
        #[arg(short, long)]
        map: String,

        /// Merge into the stored graph instead of replacing it
        #[arg(long)]
        merge: bool,
    },

    /// Export a stored graph to JSON
    Export {
        #[arg(short, long)]
        map: String,

        /// Output file
        #[arg(short, long, default_value = "semgraph-export.json")]
        output: PathBuf,
    },

    /// Show graph statistics
    Status {
        /// Map ID (lists stored maps when omitted)
        #[arg(short, long)]
        map: Option<String>,
    },

    /// Rank entities by betweenness centrality
    Centrality {
        #[arg(short, long)]
        map: String,

        /// Minimum normalized centrality (defaults to config)
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Find weakly connected cluster pairs
    Holes {
        #[arg(short, long)]
        map: String,

        /// Connection strength threshold (defaults to config)
        #[arg(short, long)]
        threshold: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Find isolated entities and unlinked co-occurring pairs
    Gaps {
        #[arg(short, long)]
        map: String,

        #[arg(long)]
        json: bool,
    },

    /// Explain the linking distance between two entities
    Distance {
        #[arg(short, long)]
        map: String,

        /// First entity (ID or term)
        a: String,

        /// Second entity (ID or term)
        b: String,

        #[arg(long)]
        json: bool,
    },

    /// List internal linking candidates for an entity
    Candidates {
        #[arg(short, long)]
        map: String,

        /// Entity (ID or term)
        entity: String,

        /// Maximum results to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List entity pairs at risk of cannibalization
    Risks {
        #[arg(short, long)]
        map: String,
    },

    /// Write the full distance matrix as JSON
    Matrix {
        #[arg(short, long)]
        map: String,

        /// Output file
        #[arg(short, long, default_value = "semgraph-matrix.json")]
        output: PathBuf,
    },

    /// Save the current graph as the drift baseline
    Snapshot {
        #[arg(short, long)]
        map: String,
    },

    /// Compare the current graph against its baseline
    Drift {
        #[arg(short, long)]
        map: String,

        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let ctx = commands::Context::new(cli.store);

    let result = match cli.command {
        Commands::Init { path } => commands::init(&path),
        Commands::Import { file, map, merge } => commands::import(&ctx, &file, &map, merge),
        Commands::Export { map, output } => commands::export(&ctx, &map, &output),
        Commands::Status { map } => commands::status(&ctx, map.as_deref()),
        Commands::Centrality {
            map,
            threshold,
            json,
        } => commands::centrality(&ctx, &map, threshold, json),
        Commands::Holes {
            map,
            threshold,
            json,
        } => commands::holes(&ctx, &map, threshold, json),
        Commands::Gaps { map, json } => commands::gaps(&ctx, &map, json),
        Commands::Distance { map, a, b, json } => commands::distance(&ctx, &map, &a, &b, json),
        Commands::Candidates { map, entity, limit } => {
            commands::candidates(&ctx, &map, &entity, limit)
        }
        Commands::Risks { map } => commands::risks(&ctx, &map),
        Commands::Matrix { map, output } => commands::matrix(&ctx, &map, &output),
        Commands::Snapshot { map } => commands::snapshot(&ctx, &map),
        Commands::Drift { map, json } => commands::drift(&ctx, &map, json),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
