//! Host application
//!
//! Wires the database module and the HTTP module into one [`Registry`] and
//! ties the connection lifecycle to the process:
//!
//! 1. startup: connect, abort on failure (nothing is bound or served)
//! 2. serve HTTP until the shutdown future resolves
//! 3. shutdown: release the connection, log a release failure and exit cleanly

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::db::{ConnectionManager, DataStore};
use crate::error::Result;
use crate::http;
use crate::registry::{database_module, Module, Registry};
use crate::state::{AppState, HTTP_MODULE};

/// The EventFlow backend process.
pub struct Application<S: DataStore> {
    manager: Arc<ConnectionManager<S>>,
    registry: Registry,
    config: ServerConfig,
}

impl<S: DataStore> Application<S> {
    pub fn new(store: S, config: ServerConfig) -> Result<Self> {
        let manager = Arc::new(ConnectionManager::new(store));
        let registry = Registry::builder()
            .module(database_module(manager.clone()))
            .module(Module::builder(HTTP_MODULE).build())
            .build()?;

        Ok(Self {
            manager,
            registry,
            config,
        })
    }

    pub fn manager(&self) -> &Arc<ConnectionManager<S>> {
        &self.manager
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        self.run_until(http::shutdown_signal()).await
    }

    /// Connect, bind the configured address, serve until `shutdown`, release.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.manager
            .scoped(|| async {
                let listener = TcpListener::bind(self.config.bind_addr).await?;
                self.serve(listener, shutdown).await
            })
            .await?
    }

    /// Like [`Application::run_until`] on an already bound listener.
    ///
    /// The listener is dropped unused if the database cannot be reached.
    pub async fn run_with_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.manager
            .scoped(|| self.serve(listener, shutdown))
            .await?
    }

    async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = AppState::<S>::from_registry(&self.registry)?;
        let router = http::build_router(state, &self.config);

        info!(database = %self.manager.target(), "EventFlow backend ready");
        http::serve(listener, router, shutdown).await?;
        Ok(())
    }
}
