//! Command implementations for the eventflow CLI

pub mod check;
pub mod config;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use eventflow_server::EventflowConfig;

pub use check::run_check;
pub use config::run_config;
pub use serve::run_serve;

/// Effective configuration: file, then environment, then `apply` for flags.
pub(crate) fn load_config<F>(path: Option<&Path>, apply: F) -> Result<EventflowConfig>
where
    F: FnOnce(&mut EventflowConfig),
{
    let mut config = EventflowConfig::load(path).context("Failed to load configuration")?;
    config
        .apply_env()
        .context("Invalid environment configuration")?;
    apply(&mut config);
    Ok(config)
}
