//! Error types for eventflow-server

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::LifecycleError;
use crate::registry::RegistryError;

pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for building and running the backend
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("dependency wiring error: {0}")]
    Registry(#[from] RegistryError),

    #[error("database lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the process must not start serving.
    pub fn is_startup_failure(&self) -> bool {
        match self {
            Self::Lifecycle(err) => err.is_fatal(),
            Self::Config(_) | Self::Registry(_) | Self::Io(_) => true,
        }
    }
}
