//! Algorithm listing commands

use clap::{Args, Subcommand};

use crate::output::{to_json, OutputFormat};
use crate::{AppContext, Cli};
use cnm_analysis::AlgorithmCategory;

#[derive(Args)]
pub struct AlgorithmsArgs {
    #[command(subcommand)]
    pub command: AlgorithmsCommands,
}

#[derive(Subcommand)]
pub enum AlgorithmsCommands {
    /// List registered algorithms
    List {
        /// Only this category: gap-detection, pattern-recognition, relationship-analysis
        #[arg(long)]
        category: Option<String>,
    },
    /// Show an algorithm's parameters
    Schema {
        /// Algorithm name
        name: String,
    },
}

pub fn run(args: &AlgorithmsArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        AlgorithmsCommands::List { category } => {
            let category = category
                .as_deref()
                .map(str::parse::<AlgorithmCategory>)
                .transpose()?;
            let descriptors = ctx.registry.descriptors(category);

            match cli.output_format() {
                OutputFormat::Json => println!("{}", to_json(&descriptors)?),
                OutputFormat::Table => {
                    for descriptor in &descriptors {
                        println!("{} [{}]", descriptor.name, descriptor.category);
                        println!("    {}", descriptor.description);
                    }
                }
            }
        }
        AlgorithmsCommands::Schema { name } => {
            let schema = ctx.registry.parameter_schema(name)?;

            match cli.output_format() {
                OutputFormat::Json => println!("{}", to_json(&schema)?),
                OutputFormat::Table => {
                    println!("{}", name);
                    for parameter in &schema {
                        println!(
                            "  {}: {} = {}    {}",
                            parameter.name,
                            parameter.param_type,
                            parameter.default_value,
                            parameter.description
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
