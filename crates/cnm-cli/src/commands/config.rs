//! Config command for managing CLI configuration

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::Cli;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key name (e.g. query.neighbor_depth, categories.materials)
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value
        value: String,
    },
    /// Print the effective configuration as TOML
    Show,
    /// Show config file path
    Path,
    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, cli: &Cli) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(cli, key),
        ConfigCommands::Set { key, value } => run_set(cli, key, value),
        ConfigCommands::Show => run_show(cli),
        ConfigCommands::Path => run_path(cli),
        ConfigCommands::Init { force } => run_init(cli, *force),
    }
}

fn run_get(cli: &Cli, key: &str) -> anyhow::Result<()> {
    let config = Config::load(&cli.config_path())?;
    match config.get(key) {
        Some(value) => println!("{}", value),
        None => anyhow::bail!(
            "Unknown config key: {} (available: {}, categories.<stem>)",
            key,
            Config::keys().join(", ")
        ),
    }
    Ok(())
}

fn run_set(cli: &Cli, key: &str, value: &str) -> anyhow::Result<()> {
    let path = cli.config_path();
    let mut config = Config::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn run_show(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(&cli.config_path())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

fn run_path(cli: &Cli) -> anyhow::Result<()> {
    println!("{}", cli.config_path().display());
    Ok(())
}

fn run_init(cli: &Cli, force: bool) -> anyhow::Result<()> {
    let path = cli.config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save(&path)?;
    println!("Created config file at {}", path.display());
    Ok(())
}
