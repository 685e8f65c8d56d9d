//! Integration tests for folder operations.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestUser};

#[tokio::test]
async fn test_requests_without_acting_user_are_rejected() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/drive/folders/root", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_nested_folders_and_details() {
    let app = TestApp::new();
    let user = TestUser::new();

    let docs = app.create_folder(&user, "Docs", None).await;
    let reports = app.create_folder(&user, "Reports", Some(&docs)).await;
    app.create_folder(&user, "Archive", Some(&docs)).await;

    let roots = app
        .request("GET", "/api/drive/folders/root", None, Some(&user))
        .await;
    assert_eq!(roots.status, StatusCode::OK);
    assert_eq!(roots.body["data"].as_array().map(Vec::len), Some(1));

    let details = app
        .request("GET", &format!("/api/drive/folders/{reports}"), None, Some(&user))
        .await;
    assert_eq!(details.status, StatusCode::OK);
    assert_eq!(details.body["data"]["folder"]["path"], "/Docs/Reports");
    let crumbs: Vec<&str> = details.body["data"]["breadcrumbs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(crumbs, ["Docs", "Reports"]);

    let children = app
        .request(
            "GET",
            &format!("/api/drive/folders/{docs}/children"),
            None,
            Some(&user),
        )
        .await;
    let names: Vec<&str> = children.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Archive", "Reports"]);
}

#[tokio::test]
async fn test_sibling_name_conflict() {
    let app = TestApp::new();
    let user = TestUser::new();
    app.create_folder(&user, "Photos", None).await;

    let response = app
        .request(
            "POST",
            "/api/drive/folders",
            Some(json!({ "name": "Photos" })),
            Some(&user),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_move_into_descendant_is_rejected() {
    let app = TestApp::new();
    let user = TestUser::new();
    let outer = app.create_folder(&user, "Outer", None).await;
    let inner = app.create_folder(&user, "Inner", Some(&outer)).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/drive/folders/{outer}"),
            Some(json!({ "name": "Outer", "parentId": inner })),
            Some(&user),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_move_to_root_updates_paths() {
    let app = TestApp::new();
    let user = TestUser::new();
    let outer = app.create_folder(&user, "Outer", None).await;
    let inner = app.create_folder(&user, "Inner", Some(&outer)).await;
    app.create_folder(&user, "Leaf", Some(&inner)).await;

    let moved = app
        .request(
            "PUT",
            &format!("/api/drive/folders/{inner}"),
            Some(json!({ "name": "Inner", "parentId": null })),
            Some(&user),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{:?}", moved.body);
    assert_eq!(moved.body["data"]["path"], "/Inner");

    let tree = app
        .request(
            "GET",
            &format!("/api/drive/folders/{inner}/tree"),
            None,
            Some(&user),
        )
        .await;
    assert_eq!(tree.body["data"][0]["children"][0]["path"], "/Inner/Leaf");
}

#[tokio::test]
async fn test_delete_requires_empty_folder() {
    let app = TestApp::new();
    let user = TestUser::new();
    let parent = app.create_folder(&user, "Parent", None).await;
    let child = app.create_folder(&user, "Child", Some(&parent)).await;

    let blocked = app
        .request("DELETE", &format!("/api/drive/folders/{parent}"), None, Some(&user))
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    let removed = app
        .request("DELETE", &format!("/api/drive/folders/{child}"), None, Some(&user))
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let gone = app
        .request("GET", &format!("/api/drive/folders/{child}"), None, Some(&user))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let now_empty = app
        .request("DELETE", &format!("/api/drive/folders/{parent}"), None, Some(&user))
        .await;
    assert_eq!(now_empty.status, StatusCode::OK);
}

#[tokio::test]
async fn test_folders_are_private_to_their_owner() {
    let app = TestApp::new();
    let owner = TestUser::new();
    let other = TestUser::new();
    let folder = app.create_folder(&owner, "Private", None).await;

    let response = app
        .request("GET", &format!("/api/drive/folders/{folder}"), None, Some(&other))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let tree = app
        .request("GET", "/api/drive/folders/tree", None, Some(&other))
        .await;
    assert_eq!(tree.body["data"].as_array().map(Vec::len), Some(0));
}
