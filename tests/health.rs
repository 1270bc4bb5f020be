mod common;

use std::sync::Arc;

use axum::extract::State;
use common::TestApp;
use trivia_bot::{
    dao::state_store::FileStateStore, dto::health::HealthStatus, routes::health::healthcheck,
};

#[tokio::test]
async fn reports_ok_for_a_writable_store() {
    let app = TestApp::new();

    let response = healthcheck(State(app.state.clone())).await;
    assert_eq!(response.0.status, HealthStatus::Ok);
}

#[tokio::test]
async fn reports_degraded_when_the_state_dir_is_unusable() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("occupied");
    std::fs::write(&blocker, "not a directory").unwrap();
    let app = TestApp::with_store(Arc::new(FileStateStore::new(&blocker)));

    let response = healthcheck(State(app.state.clone())).await;
    assert_eq!(response.0.status, HealthStatus::Degraded);
    assert_eq!(
        serde_json::to_value(&response.0).unwrap(),
        serde_json::json!({"status": "degraded"})
    );
}
