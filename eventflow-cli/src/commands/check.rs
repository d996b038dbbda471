//! Database connectivity check
//!
//! Runs the full lifecycle once (connect, ping, release) without serving.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use eventflow_server::db::{ConnectionManager, PgStore, SqliteStore};
use eventflow_server::{DataStore, DatabaseKind};

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_check(args: CheckArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, |config| {
        if let Some(url) = args.database_url {
            config.database.url = Some(url);
        }
    })?;
    config.validate().context("Invalid configuration")?;

    let url = config.database.require_url()?.to_string();
    let settings = config.database.pool_settings();

    match config.database.kind()? {
        DatabaseKind::Postgres => check_with(PgStore::new(url, settings)).await,
        DatabaseKind::Sqlite => check_with(SqliteStore::new(url, settings)).await,
    }
}

async fn check_with<S: DataStore>(store: S) -> Result<()> {
    let manager = ConnectionManager::new(store);
    let target = manager.target();
    let started = Instant::now();

    let ping = manager
        .scoped(|| manager.ping())
        .await
        .with_context(|| format!("Database check failed for {}", target))?;
    ping.with_context(|| format!("Database {} did not answer ping", target))?;

    println!(
        "database reachable: {} ({} ms)",
        target,
        started.elapsed().as_millis()
    );
    Ok(())
}
