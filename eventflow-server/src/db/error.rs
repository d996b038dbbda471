//! Error types for the database layer
//!
//! [`StoreError`] comes from the backing store itself; [`LifecycleError`] is
//! what the connection manager reports to the host process.

use std::time::Duration;

use thiserror::Error;

use super::lifecycle::LifecycleState;

/// Failure reported by a [`DataStore`](super::DataStore) primitive.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The sqlx driver or pool failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The operation did not finish within its deadline
    #[error("{operation} timed out after {}s", after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Store-specific failure that has no sqlx representation
    #[error("{0}")]
    Other(String),
}

/// Errors raised by [`ConnectionManager`](super::ConnectionManager).
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Connection-establishment failure. Fatal: startup must abort.
    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: StoreError,
    },

    /// Connection-release failure. Reported, never blocks shutdown.
    #[error("failed to release connection to {target}: {source}")]
    Release {
        target: String,
        #[source]
        source: StoreError,
    },

    /// The requested hook is not valid from the current state
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        operation: &'static str,
        state: LifecycleState,
    },

    /// The handle was requested outside the `ready` state
    #[error("database connection is unavailable ({0})")]
    Unavailable(LifecycleState),

    /// Liveness check against an open handle failed
    #[error("database ping failed: {source}")]
    Ping {
        #[source]
        source: StoreError,
    },
}

impl LifecycleError {
    /// True for the startup failure kind that must abort initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::InvalidTransition { .. })
    }
}
