//! Integration tests for file operations.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{TestApp, TestUser};

#[tokio::test]
async fn test_register_file_fills_defaults() {
    let app = TestApp::new();
    let user = TestUser::new();

    let response = app.register_file(&user, "Report.PDF", 2048, None).await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["name"], "Report.PDF");
    assert_eq!(data["originalFilename"], "Report.PDF");
    assert_eq!(data["mimeType"], "application/octet-stream");
    assert_eq!(data["extension"], "pdf");
    assert_eq!(data["state"], "active");
    assert_eq!(data["downloadCount"], 0);
    assert_eq!(data["sizeFormatted"], "2.0 KB");
}

#[tokio::test]
async fn test_register_without_size_is_rejected() {
    let app = TestApp::new();
    let user = TestUser::new();

    let response = app
        .request(
            "POST",
            "/api/drive/files",
            Some(json!({ "name": "a.txt", "storagePath": "blobs/a" })),
            Some(&user),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.used_bytes(&user).await, 0);
}

#[tokio::test]
async fn test_register_into_unknown_folder_is_not_found() {
    let app = TestApp::new();
    let user = TestUser::new();

    let response = app
        .register_file(
            &user,
            "a.txt",
            10,
            Some("00000000-0000-0000-0000-999999999999"),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(app.used_bytes(&user).await, 0);
}

#[tokio::test]
async fn test_list_files_by_folder_and_type() {
    let app = TestApp::new();
    let user = TestUser::new();
    let photos = app.create_folder(&user, "Photos", None).await;

    let png = app
        .request(
            "POST",
            "/api/drive/files",
            Some(json!({
                "folderId": photos,
                "name": "cat.png",
                "storagePath": "blobs/cat",
                "sizeBytes": 10,
                "mimeType": "image/png",
            })),
            Some(&user),
        )
        .await;
    assert_eq!(png.status, StatusCode::CREATED);
    assert_eq!(png.body["data"]["category"], "Image");
    app.register_file(&user, "notes.txt", 5, None).await;

    let in_folder = app
        .request(
            "GET",
            &format!("/api/drive/files/folder?folderId={photos}"),
            None,
            Some(&user),
        )
        .await;
    assert_eq!(in_folder.body["data"].as_array().map(Vec::len), Some(1));

    let at_root = app
        .request("GET", "/api/drive/files/folder", None, Some(&user))
        .await;
    assert_eq!(at_root.body["data"][0]["name"], "notes.txt");

    let images = app
        .request("GET", "/api/drive/files/type/image/png", None, Some(&user))
        .await;
    assert_eq!(images.status, StatusCode::OK);
    assert_eq!(images.body["data"].as_array().map(Vec::len), Some(1));

    let all = app.request("GET", "/api/drive/files", None, Some(&user)).await;
    assert_eq!(all.body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_rename_conflict_and_success() {
    let app = TestApp::new();
    let user = TestUser::new();
    app.register_file(&user, "a.txt", 1, None).await;
    let b = app.register_file(&user, "b.txt", 1, None).await.id();

    let clash = app
        .request(
            "PUT",
            &format!("/api/drive/files/{b}"),
            Some(json!({ "name": "a.txt" })),
            Some(&user),
        )
        .await;
    assert_eq!(clash.status, StatusCode::CONFLICT);

    let renamed = app
        .request(
            "PUT",
            &format!("/api/drive/files/{b}"),
            Some(json!({ "name": "c.txt" })),
            Some(&user),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["data"]["name"], "c.txt");
}

#[tokio::test]
async fn test_download_counts_access() {
    let app = TestApp::new();
    let user = TestUser::new();
    let id = app.register_file(&user, "song.mp3", 100, None).await.id();

    for _ in 0..2 {
        let download = app
            .request(
                "GET",
                &format!("/api/drive/files/{id}/download"),
                None,
                Some(&user),
            )
            .await;
        assert_eq!(download.status, StatusCode::OK);
        assert_eq!(download.body["data"]["filename"], "song.mp3");
    }

    let file = app
        .request("GET", &format!("/api/drive/files/{id}"), None, Some(&user))
        .await;
    assert_eq!(file.body["data"]["downloadCount"], 2);
    assert!(file.body["data"]["lastAccessedAt"].is_string());
}

#[tokio::test]
async fn test_deleted_file_disappears() {
    let app = TestApp::new();
    let user = TestUser::new();
    let id = app.register_file(&user, "tmp.bin", 1, None).await.id();

    let deleted = app
        .request("DELETE", &format!("/api/drive/files/{id}"), None, Some(&user))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let again = app
        .request("DELETE", &format!("/api/drive/files/{id}"), None, Some(&user))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let fetched = app
        .request("GET", &format!("/api/drive/files/{id}"), None, Some(&user))
        .await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);

    let recreated = app.register_file(&user, "tmp.bin", 1, None).await;
    assert_eq!(recreated.status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_malformed_ids_get_json_errors() {
    let app = TestApp::new();
    let user = TestUser::new();

    for path in [
        "/api/drive/files/not-a-uuid",
        "/api/drive/folders/not-a-uuid",
        "/api/drive/files/folder?folderId=nope",
    ] {
        let response = app.request("GET", path, None, Some(&user)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.error_code(), "INVALID_INPUT", "{path}");
        assert!(response.body["message"].is_string(), "{path}");
    }
}
