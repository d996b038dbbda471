//! HTTP server command
//!
//! Connects to the database, serves until Ctrl+C/SIGTERM, then releases the
//! connection.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use eventflow_server::db::{PgStore, SqliteStore};
use eventflow_server::{Application, DataStore, DatabaseKind, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, |config| {
        if let Some(bind) = args.bind {
            config.server.bind_addr = bind;
        }
        if args.cors_permissive {
            config.server.cors_permissive = true;
        }
        if let Some(url) = args.database_url {
            config.database.url = Some(url);
        }
    })?;
    config.validate().context("Invalid configuration")?;

    let url = config.database.require_url()?.to_string();
    let settings = config.database.pool_settings();

    tracing::info!("Starting EventFlow backend on {}", config.server.bind_addr);

    match config.database.kind()? {
        DatabaseKind::Postgres => serve_with(PgStore::new(url, settings), config.server).await,
        DatabaseKind::Sqlite => serve_with(SqliteStore::new(url, settings), config.server).await,
    }
}

async fn serve_with<S: DataStore>(store: S, server: ServerConfig) -> Result<()> {
    let app = Application::new(store, server).context("Failed to wire application modules")?;

    // Blocks until shutdown
    app.run()
        .await
        .context("EventFlow backend failed")?;

    Ok(())
}
