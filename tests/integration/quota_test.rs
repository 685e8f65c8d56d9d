//! Integration tests for quota accounting through the HTTP API.

use axum::http::StatusCode;

use crate::helpers::{TestApp, TestUser};

#[tokio::test]
async fn test_quota_follows_creates_and_deletes() {
    let app = TestApp::with_quota(1000);
    let user = TestUser::new();

    let first = app.register_file(&user, "a.bin", 600, None).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(app.used_bytes(&user).await, 600);

    let over = app.register_file(&user, "b.bin", 500, None).await;
    assert_eq!(over.status, StatusCode::CONFLICT);
    assert_eq!(app.used_bytes(&user).await, 600);

    let id = first.id();
    let deleted = app
        .request("DELETE", &format!("/api/drive/files/{id}"), None, Some(&user))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(app.used_bytes(&user).await, 0);

    let retry = app.register_file(&user, "b.bin", 500, None).await;
    assert_eq!(retry.status, StatusCode::CREATED);
    assert_eq!(app.used_bytes(&user).await, 500);
}

#[tokio::test]
async fn test_quota_snapshot_shape() {
    let app = TestApp::with_quota(1000);
    let user = TestUser::new();
    app.register_file(&user, "a.bin", 250, None).await;

    let response = app
        .request("GET", "/api/drive/storage/quota", None, Some(&user))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["maxBytes"], 1000);
    assert_eq!(data["availableBytes"], 750);
    assert_eq!(data["usagePercentage"].as_f64(), Some(25.0));
}

#[tokio::test]
async fn test_quota_is_per_user() {
    let app = TestApp::with_quota(1000);
    let alice = TestUser::new();
    let bob = TestUser::new();

    app.register_file(&alice, "a.bin", 900, None).await;
    let bobs = app.register_file(&bob, "a.bin", 900, None).await;

    assert_eq!(bobs.status, StatusCode::CREATED);
    assert_eq!(app.used_bytes(&alice).await, 900);
    assert_eq!(app.used_bytes(&bob).await, 900);
}

#[tokio::test]
async fn test_health_reports_memory_backend() {
    let app = TestApp::new();

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["backend"], "memory");
}
