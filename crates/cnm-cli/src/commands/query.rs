//! Graph query commands

use clap::Args;

use super::GraphArgs;
use crate::output::{graph_table, node_line, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cnm_core::limits::{validate_cluster_size, validate_query, validate_traversal_depth};
use cnm_core::{
    build_search_index, cluster_nodes, filter_graph_data, find_path, get_neighbors, GraphData, Node,
};

#[derive(Args)]
pub struct NeighborsArgs {
    /// Start node id
    pub id: String,

    /// Hop count (default: query.neighbor_depth from config)
    #[arg(short, long)]
    pub depth: Option<u32>,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct FilterArgs {
    /// Case-insensitive text matched against id, label and description
    pub query: String,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Search query; every token must match
    pub query: String,

    /// Limit results
    #[arg(short, long, default_value = "100")]
    pub limit: usize,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct PathArgs {
    /// Start node id
    pub from: String,

    /// Target node id
    pub to: String,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct ClusterArgs {
    /// Maximum nodes per cluster (default: query.cluster_size from config)
    #[arg(long)]
    pub max_size: Option<usize>,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct VisibleArgs {
    /// Camera distance
    #[arg(long)]
    pub distance: f64,

    #[command(flatten)]
    pub source: GraphArgs,
}

fn print_graph(graph: &GraphData, cli: &Cli) -> anyhow::Result<()> {
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(graph)?),
        OutputFormat::Table => print!("{}", graph_table(graph)),
    }
    Ok(())
}

fn print_nodes(nodes: &[&Node], cli: &Cli) -> anyhow::Result<()> {
    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&nodes)?),
        OutputFormat::Table => {
            println!("{} nodes", nodes.len());
            for node in nodes {
                println!("{}", node_line(node));
            }
        }
    }
    Ok(())
}

pub fn neighbors(args: &NeighborsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let depth = args.depth.unwrap_or(ctx.config.query.neighbor_depth);
    validate_traversal_depth(depth)?;

    let graph = args.source.load(&ctx.config)?;
    graph.require_node(&args.id)?;
    print_graph(&get_neighbors(&graph, &args.id, depth), cli)
}

pub fn filter(args: &FilterArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    validate_query(&args.query)?;
    let graph = args.source.load(&ctx.config)?;
    print_graph(&filter_graph_data(&graph, &args.query), cli)
}

pub fn search(args: &SearchArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    validate_query(&args.query)?;
    let graph = args.source.load(&ctx.config)?;
    let index = build_search_index(&graph.nodes);

    let hits: Vec<&Node> = index.search(&args.query).into_iter().take(args.limit).collect();
    tracing::info!("Search for '{}' returned {} results", args.query, hits.len());
    print_nodes(&hits, cli)
}

pub fn path(args: &PathArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let graph = args.source.load(&ctx.config)?;
    graph.require_node(&args.from)?;
    graph.require_node(&args.to)?;
    let Some(path) = find_path(&graph, &args.from, &args.to) else {
        anyhow::bail!("No path from {} to {}", args.from, args.to);
    };

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&path)?),
        OutputFormat::Table => println!("{} ({} hops)", path.nodes.join(" -> "), path.length),
    }
    Ok(())
}

pub fn cluster(args: &ClusterArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let max_size = args.max_size.unwrap_or(ctx.config.query.cluster_size);
    validate_cluster_size(max_size)?;

    let graph = args.source.load(&ctx.config)?;
    let clusters = cluster_nodes(&graph, max_size);

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&clusters)?),
        OutputFormat::Table => {
            println!("{} clusters (max {} nodes)", clusters.len(), max_size);
            for cluster in &clusters {
                let members: Vec<&str> = cluster.nodes.iter().map(|n| n.id.as_str()).collect();
                println!(
                    "  {} center={} size={}: {}",
                    cluster.id,
                    cluster.center,
                    cluster.size(),
                    members.join(", ")
                );
            }
        }
    }
    Ok(())
}

pub fn visible(args: &VisibleArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let lod = ctx.config.render.level_of_detail();
    let graph = args.source.load(&ctx.config)?;

    let shown: Vec<&Node> = graph
        .nodes
        .iter()
        .filter(|n| lod.should_render(n, args.distance))
        .collect();
    tracing::info!(
        "{} of {} nodes render at distance {} (threshold {:.3})",
        shown.len(),
        graph.node_count(),
        args.distance,
        lod.importance_threshold(args.distance)
    );
    print_nodes(&shown, cli)
}
