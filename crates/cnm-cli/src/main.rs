//! CNM CLI - Build, query and analyze category knowledge graphs

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use cnm_analysis::AlgorithmRegistry;
use commands::{algorithms, build, completions, query, run};
use config::{config_file_path, Config};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cnm")]
#[command(author, version, about = "Knowledge graph builder and analyzer for category-organized markdown")]
pub struct Cli {
    /// Config file (default: <config dir>/cnm/config.toml)
    #[arg(short, long, env = "CNM_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format: table, json
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        config_file_path(self.config.as_deref())
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a graph from a directory of category markdown files
    Build(build::BuildArgs),
    /// Nodes within N hops of a node
    Neighbors(query::NeighborsArgs),
    /// Nodes matching a text query, with their direct neighbors
    Filter(query::FilterArgs),
    /// Token search over ids, labels, descriptions and types
    Search(query::SearchArgs),
    /// Shortest hop path between two nodes
    Path(query::PathArgs),
    /// Partition nodes into size-capped render clusters
    Cluster(query::ClusterArgs),
    /// Nodes that render at a camera distance
    Visible(query::VisibleArgs),
    /// List algorithms and their parameters
    Algorithms(algorithms::AlgorithmsArgs),
    /// Run one algorithm
    Run(run::RunArgs),
    /// Run every algorithm concurrently
    Analyze(run::AnalyzeArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context shared by commands
pub struct AppContext {
    pub config: Config,
    pub registry: Arc<AlgorithmRegistry>,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli.config_path();
        tracing::debug!("Using config at: {:?}", path);

        Ok(Self {
            config: Config::load(&path)?,
            registry: Arc::new(AlgorithmRegistry::with_builtin()?),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting cnm CLI");

    // Commands that must work with a broken config file
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args, &cli),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let ctx = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Build(args) => build::run(args, &cli, &ctx)?,
        Commands::Neighbors(args) => query::neighbors(args, &cli, &ctx)?,
        Commands::Filter(args) => query::filter(args, &cli, &ctx)?,
        Commands::Search(args) => query::search(args, &cli, &ctx)?,
        Commands::Path(args) => query::path(args, &cli, &ctx)?,
        Commands::Cluster(args) => query::cluster(args, &cli, &ctx)?,
        Commands::Visible(args) => query::visible(args, &cli, &ctx)?,
        Commands::Algorithms(args) => algorithms::run(args, &cli, &ctx)?,
        Commands::Run(args) => run::run(args, &cli, &ctx)?,
        Commands::Analyze(args) => run::analyze(args, &cli, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    Ok(())
}
