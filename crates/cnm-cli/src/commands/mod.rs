//! CLI command implementations

use std::path::PathBuf;

use clap::Args;
use cnm_core::GraphData;

use crate::config::Config;

pub mod algorithms;
pub mod build;
pub mod completions;
pub mod config;
pub mod query;
pub mod run;

/// Graph input shared by query and analysis commands
#[derive(Args)]
pub struct GraphArgs {
    /// Graph JSON file from `cnm build`, or a directory of category markdown
    #[arg(short, long, default_value = "graph.json")]
    pub graph: PathBuf,
}

impl GraphArgs {
    pub fn load(&self, config: &Config) -> anyhow::Result<GraphData> {
        build::load_graph(&self.graph, config)
    }
}
