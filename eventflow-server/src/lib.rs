//! eventflow-server: EventFlow backend host
//!
//! Owns the process-wide database connection (opened on startup, released on
//! shutdown), the module registry that hands it to dependents, and the HTTP
//! surface that reports on it.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod registry;
pub mod state;

pub use app::Application;
pub use config::{load_dotenv, DatabaseConfig, EventflowConfig, ServerConfig};
pub use db::{ConnectionManager, DataStore, DatabaseKind, LifecycleError, LifecycleState};
pub use error::{Error, Result};
pub use registry::{Module, Registry, RegistryError};
pub use state::AppState;
