//! Application state shared across handlers

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::db::{ConnectionManager, DataStore};
use crate::registry::{Registry, RegistryError};

/// Module name the HTTP layer resolves its dependencies as.
pub const HTTP_MODULE: &str = "http";

/// Shared application state
pub struct AppState<S: DataStore> {
    inner: Arc<AppStateInner<S>>,
}

struct AppStateInner<S: DataStore> {
    db: Arc<ConnectionManager<S>>,
    started_at: DateTime<Utc>,
    start_instant: Instant,
}

impl<S: DataStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DataStore> std::fmt::Debug for AppState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("started_at", &self.inner.started_at)
            .finish_non_exhaustive()
    }
}

impl<S: DataStore> AppState<S> {
    pub fn new(db: Arc<ConnectionManager<S>>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                started_at: Utc::now(),
                start_instant: Instant::now(),
            }),
        }
    }

    /// Resolve dependencies from the registry as the `http` module.
    ///
    /// Fails unless the connection manager is ready.
    pub fn from_registry(registry: &Registry) -> Result<Self, RegistryError> {
        let db = registry.resolve::<ConnectionManager<S>>(HTTP_MODULE)?;
        Ok(Self::new(db))
    }

    pub fn db(&self) -> &ConnectionManager<S> {
        &self.inner.db
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.inner.start_instant.elapsed().as_secs()
    }
}
