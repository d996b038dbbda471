//! Router middleware against a live connection manager

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::FakeStore;
use eventflow_server::db::ConnectionManager;
use eventflow_server::http::build_router;
use eventflow_server::{AppState, ServerConfig};
use tower::ServiceExt;

async fn ready_state(store: FakeStore) -> AppState<FakeStore> {
    let manager = Arc::new(ConnectionManager::new(store));
    manager.startup().await.unwrap();
    AppState::new(manager)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn slow_health_check_times_out() {
    let state = ready_state(FakeStore {
        ping_delay: Some(Duration::from_secs(60)),
        ..FakeStore::default()
    })
    .await;
    let config = ServerConfig {
        request_timeout_secs: 2,
        ..ServerConfig::default()
    };

    let response = build_router(state.clone(), &config)
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    state.db().shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn health_within_timeout_is_ok() {
    let state = ready_state(FakeStore {
        ping_delay: Some(Duration::from_secs(1)),
        ..FakeStore::default()
    })
    .await;
    let config = ServerConfig {
        request_timeout_secs: 2,
        ..ServerConfig::default()
    };

    let response = build_router(state.clone(), &config)
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    state.db().shutdown().await.unwrap();
}
