//! Connection lifecycle manager
//!
//! Owns the single shared handle to the backing store and ties it to the
//! host process lifecycle:
//!
//! ```text
//! Uninitialized ──startup──▶ Connecting ──ok──▶ Ready ──shutdown──▶ Closing ──▶ Closed
//!       │                        │
//!       │                        └──err──▶ Failed
//!       └──────────── shutdown (nothing to release) ─────────────────────────▶ Closed
//! ```
//!
//! `Failed` and `Closed` are terminal. Shutdown is idempotent: once the
//! manager has left `Ready`, further calls are no-ops.

use std::fmt;
use std::future::Future;
use std::sync::OnceLock;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use super::error::LifecycleError;
use super::store::DataStore;

/// Observable state of the connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Connecting,
    Ready,
    Closing,
    Closed,
    /// Connect attempt failed; this instance can never become ready.
    Failed,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single shared connection to the data store, opened on startup and
/// released on shutdown.
///
/// Construct exactly one per process at the entry point and share it as
/// `Arc<ConnectionManager<S>>` (see [`crate::registry::database_module`]).
pub struct ConnectionManager<S: DataStore> {
    store: S,
    handle: OnceLock<S::Handle>,
    state: watch::Sender<LifecycleState>,
    // Serializes startup/shutdown; never held by `handle()`.
    transition: Mutex<()>,
}

impl<S: DataStore> ConnectionManager<S> {
    pub fn new(store: S) -> Self {
        let (state, _) = watch::channel(LifecycleState::Uninitialized);
        Self {
            store,
            handle: OnceLock::new(),
            state,
            transition: Mutex::new(()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Redacted description of the store this manager connects to.
    pub fn target(&self) -> String {
        self.store.target()
    }

    fn set_state(&self, next: LifecycleState) {
        let prev = self.state.send_replace(next);
        debug!(from = %prev, to = %next, "database lifecycle transition");
    }

    /// Startup hook: establish the connection.
    ///
    /// Must complete before any dependent uses the handle. A connect failure
    /// leaves the manager in [`LifecycleState::Failed`] and must abort host
    /// initialization.
    pub async fn startup(&self) -> Result<(), LifecycleError> {
        let _guard = self.transition.lock().await;

        let current = self.state();
        if current != LifecycleState::Uninitialized {
            return Err(LifecycleError::InvalidTransition {
                operation: "start up",
                state: current,
            });
        }

        let target = self.store.target();
        self.set_state(LifecycleState::Connecting);
        info!(database = %target, "connecting to database");

        match self.store.connect().await {
            Ok(handle) => {
                // Uninitialized is never re-entered, so the cell is empty here.
                let _ = self.handle.set(handle);
                self.set_state(LifecycleState::Ready);
                info!(database = %target, "database connection ready");
                Ok(())
            }
            Err(source) => {
                self.set_state(LifecycleState::Failed);
                error!(database = %target, error = %source, "database connection failed");
                Err(LifecycleError::Connect { target, source })
            }
        }
    }

    /// Shutdown hook: release the connection.
    ///
    /// Idempotent. The first call from `Ready` closes the handle; every later
    /// call returns `Ok(())` without touching the store. A release failure is
    /// returned for reporting, but the manager is `Closed` regardless.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        let _guard = self.transition.lock().await;

        match self.state() {
            LifecycleState::Ready => {}
            LifecycleState::Closing | LifecycleState::Closed => {
                debug!("database already closed, shutdown is a no-op");
                return Ok(());
            }
            state @ (LifecycleState::Uninitialized | LifecycleState::Failed) => {
                debug!(from = %state, "no open database connection to release");
                self.set_state(LifecycleState::Closed);
                return Ok(());
            }
            LifecycleState::Connecting => {
                // Unreachable while the transition lock is held by us.
                return Err(LifecycleError::InvalidTransition {
                    operation: "shut down",
                    state: LifecycleState::Connecting,
                });
            }
        }

        let target = self.store.target();
        self.set_state(LifecycleState::Closing);
        info!(database = %target, "closing database connection");

        let result = match self.handle.get() {
            Some(handle) => self.store.disconnect(handle).await,
            None => Ok(()),
        };
        self.set_state(LifecycleState::Closed);

        match result {
            Ok(()) => {
                info!(database = %target, "database connection closed");
                Ok(())
            }
            Err(source) => {
                warn!(database = %target, error = %source, "database connection release failed");
                Err(LifecycleError::Release { target, source })
            }
        }
    }

    /// Borrow the shared handle. Only available while `Ready`.
    pub fn handle(&self) -> Result<&S::Handle, LifecycleError> {
        match self.state() {
            LifecycleState::Ready => self
                .handle
                .get()
                .ok_or(LifecycleError::Unavailable(LifecycleState::Ready)),
            state => Err(LifecycleError::Unavailable(state)),
        }
    }

    /// Round-trip to the store over the shared handle.
    pub async fn ping(&self) -> Result<(), LifecycleError> {
        let handle = self.handle()?;
        self.store
            .ping(handle)
            .await
            .map_err(|source| LifecycleError::Ping { source })
    }

    /// Wait until startup has finished.
    ///
    /// Resolves `Ok` once `Ready`; errors if the manager fails or closes
    /// without ever becoming ready.
    pub async fn wait_ready(&self) -> Result<(), LifecycleError> {
        let mut rx = self.state.subscribe();
        let state = *rx
            .wait_for(|state| {
                !matches!(
                    state,
                    LifecycleState::Uninitialized | LifecycleState::Connecting
                )
            })
            .await
            .map_err(|_| LifecycleError::Unavailable(self.state()))?;

        match state {
            LifecycleState::Ready => Ok(()),
            other => Err(LifecycleError::Unavailable(other)),
        }
    }

    /// Run `body` between startup and shutdown.
    ///
    /// Startup failure is returned before `body` runs. Shutdown always runs
    /// once `body` completes; a release failure is logged, not returned.
    pub async fn scoped<F, Fut, T>(&self, body: F) -> Result<T, LifecycleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.startup().await?;
        let output = body().await;
        if let Err(err) = self.shutdown().await {
            warn!(error = %err, "continuing shutdown after release failure");
        }
        Ok(output)
    }
}

impl<S: DataStore> Drop for ConnectionManager<S> {
    fn drop(&mut self) {
        if self.state() == LifecycleState::Ready {
            warn!(
                database = %self.store.target(),
                "connection manager dropped without shutdown"
            );
        }
    }
}

impl<S: DataStore> fmt::Debug for ConnectionManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("target", &self.store.target())
            .field("state", &self.state())
            .finish()
    }
}
