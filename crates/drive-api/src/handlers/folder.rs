//! Folder CRUD, contents, and tree handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use drive_core::types::FolderId;
use drive_entity::folder::{Folder, FolderNode};
use drive_service::FolderDetails;

use crate::dto::request::{CreateFolderBody, UpdateFolderBody};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ActingUser, ValidatedJson, ValidatedPath};
use crate::state::AppState;

/// GET /api/drive/folders/root
pub async fn list_root_folders(
    State(state): State<AppState>,
    user: ActingUser,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let folders = state.drive.list_children(&user, None).await?;
    Ok(Json(ApiResponse::ok(folders)))
}

/// GET /api/drive/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FolderId>,
) -> ApiResult<Json<ApiResponse<FolderDetails>>> {
    let details = state.drive.folder_details(&user, id).await?;
    Ok(Json(ApiResponse::ok(details)))
}

/// GET /api/drive/folders/{id}/children
pub async fn list_children(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FolderId>,
) -> ApiResult<Json<ApiResponse<Vec<Folder>>>> {
    let children = state.drive.list_children(&user, Some(id)).await?;
    Ok(Json(ApiResponse::ok(children)))
}

/// GET /api/drive/folders/tree
pub async fn get_full_tree(
    State(state): State<AppState>,
    user: ActingUser,
) -> ApiResult<Json<ApiResponse<Vec<FolderNode>>>> {
    let tree = state.drive.folder_tree(&user, None).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// GET /api/drive/folders/{id}/tree
pub async fn get_tree(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FolderId>,
) -> ApiResult<Json<ApiResponse<Vec<FolderNode>>>> {
    let tree = state.drive.folder_tree(&user, Some(id)).await?;
    Ok(Json(ApiResponse::ok(tree)))
}

/// POST /api/drive/folders
pub async fn create_folder(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedJson(body): ValidatedJson<CreateFolderBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Folder>>)> {
    let folder = state.drive.create_folder(&user, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder))))
}

/// PUT /api/drive/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FolderId>,
    ValidatedJson(body): ValidatedJson<UpdateFolderBody>,
) -> ApiResult<Json<ApiResponse<Folder>>> {
    let folder = state.drive.update_folder(&user, id, body.into()).await?;
    Ok(Json(ApiResponse::ok(folder)))
}

/// DELETE /api/drive/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FolderId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.drive.delete_folder(&user, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Folder deleted"))))
}
