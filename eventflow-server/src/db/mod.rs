//! Database layer - store seam, pool settings and the connection lifecycle
//!
//! # Design Principles
//!
//! - One connection manager per process, shared as `Arc` - no global state
//! - The store is owned by the manager (composition), not extended
//! - Connect failures abort startup; release failures are only reported

pub mod error;
pub mod lifecycle;
pub mod pool;
pub mod store;

pub use error::{LifecycleError, StoreError};
pub use lifecycle::{ConnectionManager, LifecycleState};
pub use pool::{create_pool, PoolSettings};
pub use store::{redact_url, DataStore, DatabaseKind, PgStore, SqliteStore, SqlxStore};
