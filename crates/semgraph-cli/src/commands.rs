//! CLI command implementations.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use semgraph_graph::{
    AnalyticsConfig, GapKind, GraphExport, GraphStore, HolePriority, KnowledgeGraph,
    SemanticDistance,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const SEMGRAPH_DIR: &str = ".semgraph";

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No graph stored under map \"{0}\" (run `semgraph import` first)")]
    MapNotFound(String),
    #[error("No baseline for map \"{0}\" (run `semgraph snapshot` first)")]
    NoBaseline(String),
    #[error("Graph has {nodes} nodes; the distance matrix is limited to {max} (see max_matrix_nodes)")]
    MatrixTooLarge { nodes: usize, max: usize },
}

/// Paths shared by every command.
pub struct Context {
    store_path: PathBuf,
    config_path: PathBuf,
}

impl Context {
    pub fn new(store: Option<PathBuf>) -> Self {
        let root = PathBuf::from(SEMGRAPH_DIR);
        Self {
            store_path: store.unwrap_or_else(|| root.join("store")),
            config_path: root.join("config.json"),
        }
    }

    fn config(&self) -> Result<AnalyticsConfig> {
        Ok(AnalyticsConfig::load(&self.config_path)?)
    }

    fn store(&self) -> Result<GraphStore> {
        Ok(GraphStore::open(&self.store_path)?)
    }

    fn load(&self, store: &GraphStore, map: &str) -> Result<KnowledgeGraph> {
        store
            .load_graph(map)?
            .ok_or_else(|| CommandError::MapNotFound(map.to_string()).into())
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message);
    Ok(spinner)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize Semgraph in a directory.
pub fn init(path: &Path) -> Result<()> {
    let semgraph_dir = path.join(SEMGRAPH_DIR);

    if semgraph_dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&semgraph_dir)?;

    let config_path = semgraph_dir.join("config.json");
    fs::write(&config_path, AnalyticsConfig::default().to_json_pretty()?)?;

    println!("{} Initialized Semgraph in {}", "✓".green(), path.display());
    println!(
        "  Run {} to load a graph",
        "semgraph import <file> --map <id>".cyan()
    );

    Ok(())
}

/// Import a JSON export into the store.
pub fn import(ctx: &Context, file: &Path, map: &str, merge: bool) -> Result<()> {
    let raw = fs::read_to_string(file)?;
    let export: GraphExport = serde_json::from_str(&raw)?;

    let store = ctx.store()?;
    let mut graph = match store.load_graph(map)? {
        Some(existing) if merge => existing,
        _ => KnowledgeGraph::new(),
    };
    let skipped = graph.load_export(&export);
    store.save_graph(map, &graph)?;

    info!(map, nodes = graph.node_count(), "imported graph");
    println!(
        "{} Imported {} nodes, {} edges into {}",
        "✓".green(),
        graph.node_count().to_string().cyan(),
        graph.edge_count().to_string().cyan(),
        map.cyan()
    );

    if skipped > 0 {
        println!(
            "{} {} edges referenced unknown nodes and were skipped",
            "⚠".yellow(),
            skipped
        );
    }

    Ok(())
}

/// Export a stored graph to JSON.
pub fn export(ctx: &Context, map: &str, output: &Path) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;

    fs::write(output, serde_json::to_string_pretty(&graph.to_export())?)?;
    println!("{} Exported to {}", "✓".green(), output.display());

    Ok(())
}

/// Show statistics for one map, or list stored maps.
pub fn status(ctx: &Context, map: Option<&str>) -> Result<()> {
    let store = ctx.store()?;

    let Some(map) = map else {
        let ids = store.map_ids()?;
        if ids.is_empty() {
            println!("No graphs stored in {}", ctx.store_path.display());
        } else {
            println!("Stored maps:\n");
            for id in ids {
                println!("  {}", id.cyan());
            }
        }
        return Ok(());
    };

    let graph = ctx.load(&store, map)?;
    let stats = graph.stats();

    println!("{}", format!("Map {}", map).bold());
    println!("  Nodes:          {}", stats.node_count.to_string().cyan());
    println!("  Edges:          {}", stats.edge_count.to_string().cyan());
    println!("  Components:     {}", stats.component_count);
    println!("  Co-occurrences: {}", stats.co_occurrence_count);
    println!("  With context:   {}", stats.context_entity_count);

    let by_category = graph.get_edges_by_category();
    if !by_category.is_empty() {
        println!("\n  Edges by category:");
        for (bucket, edges) in by_category {
            println!("    {:<14} {}", bucket.to_string(), edges.len());
        }
    }

    if store.load_snapshot(map)?.is_some() {
        println!("\n  Baseline saved: {}", "yes".green());
    }

    Ok(())
}

/// Rank bridge entities by centrality.
pub fn centrality(ctx: &Context, map: &str, threshold: Option<f64>, json: bool) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;

    let bridges = graph.find_bridge_entities(threshold.unwrap_or(config.bridge_threshold));

    if json {
        return print_json(&bridges);
    }

    if bridges.is_empty() {
        println!("No bridge entities above the threshold");
        return Ok(());
    }

    println!("Found {} bridge entities:\n", bridges.len());
    for bridge in bridges {
        println!(
            "  {:>5.2} {} {}",
            bridge.centrality,
            bridge.term.cyan(),
            format!("({})", bridge.id).dimmed()
        );
    }

    Ok(())
}

fn priority_label(priority: HolePriority) -> colored::ColoredString {
    match priority {
        HolePriority::Critical => priority.as_str().red().bold(),
        HolePriority::High => priority.as_str().red(),
        HolePriority::Medium => priority.as_str().yellow(),
        HolePriority::Low => priority.as_str().dimmed(),
    }
}

/// Report structural holes.
pub fn holes(ctx: &Context, map: &str, threshold: Option<f64>, json: bool) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;

    let progress = spinner("Analyzing graph structure...")?;
    let holes = graph
        .identify_structural_holes_with(threshold.unwrap_or(config.structural_hole_threshold));
    progress.finish_and_clear();

    if json {
        return print_json(&holes);
    }

    if holes.is_empty() {
        println!("{} No structural holes found", "✓".green());
        return Ok(());
    }

    println!("Found {} structural holes:\n", holes.len());
    for hole in &holes {
        println!(
            "  [{}] strength {:.3}",
            priority_label(hole.priority),
            hole.connection_strength
        );
        println!("    {}", hole.cluster_a_terms.join(", "));
        println!("    {}", "↕".dimmed());
        println!("    {}", hole.cluster_b_terms.join(", "));
        if !hole.bridge_candidates.is_empty() {
            let names: Vec<&str> = hole
                .bridge_candidates
                .iter()
                .map(|c| c.term.as_str())
                .collect();
            println!("    Bridge via: {}", names.join(", ").cyan());
        }
        println!();
    }

    Ok(())
}

/// Report knowledge gaps.
pub fn gaps(ctx: &Context, map: &str, json: bool) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let gaps = graph.identify_knowledge_gaps();

    if json {
        return print_json(&gaps);
    }

    if gaps.is_empty() {
        println!("{} No knowledge gaps found", "✓".green());
        return Ok(());
    }

    println!("Found {} knowledge gaps:\n", gaps.len());
    for gap in gaps {
        let kind = match gap.kind {
            GapKind::IsolatedEntity => "isolated".yellow(),
            GapKind::MissingRelationship => "missing link".cyan(),
        };
        println!("  {:>5.2} {} {}", gap.severity, kind, gap.description);
    }

    Ok(())
}

fn print_distance(d: &SemanticDistance) {
    let verdict = if d.should_link {
        "link".green().bold()
    } else {
        "don't link".dimmed()
    };
    println!("  {} ↔ {}: {:.2} ({})", d.entity_a.cyan(), d.entity_b.cyan(), d.distance, verdict);
}

/// Explain the distance between two entities.
pub fn distance(ctx: &Context, map: &str, a: &str, b: &str, json: bool) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let d = graph.calculate_semantic_distance(a, b);

    if json {
        return print_json(&d);
    }

    print_distance(&d);
    println!("    similarity    {:.2}", d.cosine_similarity);
    println!("    context       {:.2}", d.context_weight);
    println!("    co-occurrence {:.2}", d.co_occurrence_score);
    println!("    combined      {:.2}", d.combined_similarity);
    println!("\n  {}", d.recommendation);

    Ok(())
}

/// List linking candidates for an entity.
pub fn candidates(ctx: &Context, map: &str, entity: &str, limit: usize) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let candidates = graph.find_linking_candidates(entity);

    if candidates.is_empty() {
        println!("No linking candidates for \"{}\"", entity);
        return Ok(());
    }

    println!("Found {} linking candidates:\n", candidates.len());
    for candidate in candidates.iter().take(limit) {
        print_distance(candidate);
    }

    Ok(())
}

/// List cannibalization risks.
pub fn risks(ctx: &Context, map: &str) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let risks = graph.identify_cannibalization_risks();

    if risks.is_empty() {
        println!("{} No cannibalization risks", "✓".green());
        return Ok(());
    }

    println!("{} {} pairs at risk:\n", "⚠".yellow(), risks.len());
    for risk in &risks {
        print_distance(risk);
    }

    Ok(())
}

/// Write the dense distance matrix.
pub fn matrix(ctx: &Context, map: &str, output: &Path) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;

    if graph.node_count() > config.max_matrix_nodes {
        return Err(CommandError::MatrixTooLarge {
            nodes: graph.node_count(),
            max: config.max_matrix_nodes,
        }
        .into());
    }

    let progress = spinner("Computing pairwise distances...")?;
    let matrix = graph.build_distance_matrix();
    progress.finish_and_clear();

    fs::write(output, serde_json::to_string_pretty(&matrix)?)?;
    println!(
        "{} Wrote {}×{} matrix to {}",
        "✓".green(),
        matrix.len(),
        matrix.len(),
        output.display()
    );

    Ok(())
}

/// Save the drift baseline.
pub fn snapshot(ctx: &Context, map: &str) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let snapshot = graph.create_snapshot();
    store.save_snapshot(map, &snapshot)?;

    println!(
        "{} Saved baseline for {} ({} nodes, {} edges)",
        "✓".green(),
        map.cyan(),
        snapshot.node_count,
        snapshot.edge_count
    );

    Ok(())
}

/// Compare against the saved baseline.
pub fn drift(ctx: &Context, map: &str, json: bool) -> Result<()> {
    let store = ctx.store()?;
    let graph = ctx.load(&store, map)?;
    let baseline = store
        .load_snapshot(map)?
        .ok_or_else(|| CommandError::NoBaseline(map.to_string()))?;

    let report = graph.detect_drift(&baseline);

    if json {
        return print_json(&report);
    }

    println!("{}", report.summary().bold());
    println!(
        "  Baseline from {}",
        report.baseline_timestamp.format("%Y-%m-%d %H:%M UTC")
    );

    for entity in &report.added_entities {
        println!("  {} {}", "+".green(), entity.term);
    }
    for entity in &report.removed_entities {
        println!("  {} {}", "-".red(), entity.term);
    }
    for edge in &report.added_edges {
        println!("  {} {}", "+".green(), edge.dimmed());
    }
    for edge in &report.removed_edges {
        println!("  {} {}", "-".red(), edge.dimmed());
    }
    if !report.orphaned_entities.is_empty() {
        let names: Vec<&str> = report
            .orphaned_entities
            .iter()
            .map(|e| e.term.as_str())
            .collect();
        println!("\n  {} Orphaned: {}", "⚠".yellow(), names.join(", "));
    }

    Ok(())
}
