use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventflow_server::EventflowConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (database password masked)
    Show,
    /// Show config file path
    Path,
}

pub fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => run_show(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn run_show(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, |_| {})?;
    if let Err(e) = config.validate() {
        tracing::warn!("configuration is incomplete: {}", e);
    }

    let rendered = config
        .to_redacted_toml()
        .context("Failed to render configuration")?;
    print!("{}", rendered);
    Ok(())
}

fn run_path(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => path.to_path_buf(),
        None => EventflowConfig::default_path().context("Could not determine home directory")?,
    };

    println!("{}", path.display());
    if !path.exists() {
        eprintln!("(not found, built-in defaults apply)");
    }
    Ok(())
}
