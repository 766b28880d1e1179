//! Graph build command

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;

use crate::config::Config;
use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};
use cnm_analysis::{BetweennessCentrality, CentralityRow, Params};
use cnm_core::limits::validate_document;
use cnm_core::{BuildReport, CategoryDocument, GraphBuilder, GraphData};

#[derive(Args)]
pub struct BuildArgs {
    /// Directory of category markdown files (e.g. materials.md, methods.md)
    pub input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Store betweenness centrality as each node's value
    #[arg(long)]
    pub with_centrality: bool,
}

/// Parse every mapped markdown file in `dir` into one graph
pub fn build_from_dir(dir: &Path, config: &Config) -> anyhow::Result<(GraphData, BuildReport)> {
    let categories = config.category_map()?;

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("md"))
        })
        .collect();
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_lowercase();
        let Some(&category) = categories.get(&stem) else {
            tracing::warn!("Skipping {}: no category mapped for '{}'", path.display(), stem);
            continue;
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        validate_document(&text).with_context(|| path.display().to_string())?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::debug!("Parsing {} as {}", name, category);
        documents.push(CategoryDocument::parse(category, &text).with_source(name));
    }

    if documents.is_empty() {
        anyhow::bail!("No category markdown files found in {}", dir.display());
    }
    documents.sort_by(|a, b| {
        a.category
            .rank()
            .cmp(&b.category.rank())
            .then_with(|| a.source.cmp(&b.source))
    });

    let mut builder = GraphBuilder::new();
    for document in documents {
        builder.add_document(document);
    }
    Ok(builder.build())
}

/// Read a graph JSON file, or build from a markdown directory
pub fn load_graph(path: &Path, config: &Config) -> anyhow::Result<GraphData> {
    if path.is_dir() {
        return Ok(build_from_dir(path, config)?.0);
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph {}", path.display()))?;
    let graph = GraphData::from_json_lenient(&text)
        .with_context(|| format!("Invalid graph {}", path.display()))?;
    tracing::debug!(
        "Loaded {} nodes and {} links from {}",
        graph.node_count(),
        graph.link_count(),
        path.display()
    );
    Ok(graph)
}

pub fn run(args: &BuildArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let (mut graph, report) = build_from_dir(&args.input, &ctx.config)?;

    if args.with_centrality {
        let result = ctx
            .registry
            .execute(BetweennessCentrality::NAME, &graph, &Params::new())?;
        let scores: HashMap<String, f64> = result
            .rows::<CentralityRow>()?
            .into_iter()
            .map(|row| (row.node_id, row.betweenness))
            .collect();
        graph = graph.with_values(&scores);
    }

    let json = graph.to_json_pretty()?;
    let Some(output) = &args.output else {
        println!("{}", json);
        return Ok(());
    };

    std::fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;
    if cli.quiet {
        return Ok(());
    }
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Table => {
            println!(
                "Built graph: {} nodes, {} links from {} documents -> {}",
                graph.node_count(),
                graph.link_count(),
                report.documents,
                output.display()
            );
            if report.unresolved_references > 0 {
                println!("Dropped {} unresolved references", report.unresolved_references);
            }
        }
    }
    Ok(())
}
