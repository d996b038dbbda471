//! Health check endpoint
//!
//! Reports the connection lifecycle state and whether a round-trip to the
//! database succeeds. Anything other than a ready, pingable connection is a
//! `503`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::DataStore;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub state: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /health
async fn health<S: DataStore>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let ping = state.db().ping().await;
    let lifecycle = state.db().state();

    let (status, code) = if ping.is_ok() {
        ("ok", StatusCode::OK)
    } else {
        ("unavailable", StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        started_at: state.started_at(),
        database: DatabaseHealth {
            state: lifecycle.as_str(),
            connected: ping.is_ok(),
            error: ping.err().map(|e| e.to_string()),
        },
    };

    (code, Json(body))
}

/// Health routes
pub fn router<S: DataStore>() -> Router<AppState<S>> {
    Router::new().route("/health", get(health::<S>))
}
