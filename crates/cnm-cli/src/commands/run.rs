//! Algorithm execution commands

use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use super::GraphArgs;
use crate::output::{result_table, to_json, OutputFormat};
use crate::{AppContext, Cli};
use cnm_analysis::{AlgorithmCategory, AlgorithmResult, ParamValue, Params};

#[derive(Args)]
pub struct RunArgs {
    /// Algorithm name (see `cnm algorithms list`)
    pub name: String,

    /// Parameter as KEY=VALUE (can be used multiple times)
    #[arg(short, long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Rows shown in table output
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub source: GraphArgs,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Only algorithms of this category
    #[arg(long)]
    pub category: Option<String>,

    /// Rows shown per algorithm in table output
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    #[command(flatten)]
    pub source: GraphArgs,
}

/// One failed algorithm in an analyze run
#[derive(Debug, Serialize)]
pub struct Failure {
    pub algorithm: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub results: Vec<AlgorithmResult>,
    pub failures: Vec<Failure>,
}

/// Parse `KEY=VALUE` pairs into algorithm parameters
pub fn parse_params(raw: &[String]) -> anyhow::Result<Params> {
    let mut params = Params::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            anyhow::bail!("Invalid parameter '{}', expected KEY=VALUE", pair);
        };
        let value: ParamValue = match value.parse() {
            Ok(value) => value,
            Err(never) => match never {},
        };
        params.insert(key.trim().to_string(), value);
    }
    Ok(params)
}

pub fn run(args: &RunArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let params = parse_params(&args.params)?;
    let graph = args.source.load(&ctx.config)?;
    let result = ctx.registry.execute(&args.name, &graph, &params)?;

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&result)?),
        OutputFormat::Table => print!("{}", result_table(&result, args.limit)),
    }
    Ok(())
}

/// Run every selected algorithm on its own blocking task
///
/// A failing algorithm is reported alongside the others' results; the
/// command fails only when nothing succeeded.
pub async fn analyze(args: &AnalyzeArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let category = args
        .category
        .as_deref()
        .map(str::parse::<AlgorithmCategory>)
        .transpose()?;
    let graph = Arc::new(args.source.load(&ctx.config)?);
    let names: Vec<String> = ctx
        .registry
        .descriptors(category)
        .into_iter()
        .map(|d| d.name)
        .collect();

    let handles: Vec<_> = names
        .iter()
        .map(|name| {
            let registry = Arc::clone(&ctx.registry);
            let graph = Arc::clone(&graph);
            let name = name.clone();
            tokio::task::spawn_blocking(move || registry.execute(&name, &graph, &Params::new()))
        })
        .collect();

    let mut report = AnalyzeReport {
        results: Vec::new(),
        failures: Vec::new(),
    };
    for (name, handle) in names.iter().zip(handles) {
        let error = match handle.await {
            Ok(Ok(result)) => {
                report.results.push(result);
                continue;
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("task failed: {}", e),
        };
        tracing::warn!("{} failed: {}", name, error);
        report.failures.push(Failure {
            algorithm: name.clone(),
            error,
        });
    }

    match cli.output_format() {
        OutputFormat::Json => println!("{}", to_json(&report)?),
        OutputFormat::Table => {
            for result in &report.results {
                print!("{}", result_table(result, Some(args.limit)));
            }
            for failure in &report.failures {
                eprintln!("{} failed: {}", failure.algorithm, failure.error);
            }
        }
    }

    if report.results.is_empty() && !report.failures.is_empty() {
        anyhow::bail!("All {} algorithms failed", report.failures.len());
    }
    Ok(())
}
