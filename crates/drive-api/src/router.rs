//! Route definitions for the drive HTTP API.
//!
//! Drive routes are mounted under `/api/drive`; `/health` sits at the root.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route and the shared state.
pub fn build_router(state: AppState) -> Router {
    let drive_routes = Router::new()
        .merge(quota_routes())
        .merge(folder_routes())
        .merge(file_routes());

    Router::new()
        .nest("/api/drive", drive_routes)
        .route("/health", get(handlers::health::health))
        .with_state(state)
}

/// Storage quota
fn quota_routes() -> Router<AppState> {
    Router::new().route("/storage/quota", get(handlers::quota::get_quota))
}

/// Folder CRUD, contents, and tree
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", post(handlers::folder::create_folder))
        .route("/folders/root", get(handlers::folder::list_root_folders))
        .route("/folders/tree", get(handlers::folder::get_full_tree))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .put(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route("/folders/{id}/children", get(handlers::folder::list_children))
        .route("/folders/{id}/tree", get(handlers::folder::get_tree))
}

/// File registry
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_all_files).post(handlers::file::create_file),
        )
        .route("/files/folder", get(handlers::file::list_files_in_folder))
        .route("/files/type/{*mime}", get(handlers::file::list_files_by_type))
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .put(handlers::file::rename_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
}
