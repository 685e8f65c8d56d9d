//! File registry handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use drive_core::types::FileId;
use drive_entity::file::DriveFile;

use crate::dto::request::{CreateFileBody, FolderQuery, RenameFileBody};
use crate::dto::response::{ApiResponse, DownloadResponse, FileResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{ActingUser, ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::state::AppState;

fn views(files: Vec<DriveFile>) -> Vec<FileResponse> {
    files.into_iter().map(FileResponse::from).collect()
}

/// GET /api/drive/files
pub async fn list_all_files(
    State(state): State<AppState>,
    user: ActingUser,
) -> ApiResult<Json<ApiResponse<Vec<FileResponse>>>> {
    let files = state.drive.list_all_files(&user).await?;
    Ok(Json(ApiResponse::ok(views(files))))
}

/// GET /api/drive/files/folder?folderId=
pub async fn list_files_in_folder(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedQuery(query): ValidatedQuery<FolderQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FileResponse>>>> {
    let files = state.drive.list_files(&user, query.folder_id).await?;
    Ok(Json(ApiResponse::ok(views(files))))
}

/// GET /api/drive/files/type/{*mime}
pub async fn list_files_by_type(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(mime): ValidatedPath<String>,
) -> ApiResult<Json<ApiResponse<Vec<FileResponse>>>> {
    let files = state.drive.list_files_by_type(&user, &mime).await?;
    Ok(Json(ApiResponse::ok(views(files))))
}

/// GET /api/drive/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FileId>,
) -> ApiResult<Json<ApiResponse<FileResponse>>> {
    let file = state.drive.get_file(&user, id).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// POST /api/drive/files
pub async fn create_file(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedJson(body): ValidatedJson<CreateFileBody>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FileResponse>>)> {
    let file = state.drive.create_file(&user, body.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file.into()))))
}

/// PUT /api/drive/files/{id}
pub async fn rename_file(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FileId>,
    ValidatedJson(body): ValidatedJson<RenameFileBody>,
) -> ApiResult<Json<ApiResponse<FileResponse>>> {
    let file = state.drive.rename_file(&user, id, &body.name).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// DELETE /api/drive/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FileId>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.drive.delete_file(&user, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("File deleted"))))
}

/// GET /api/drive/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    user: ActingUser,
    ValidatedPath(id): ValidatedPath<FileId>,
) -> ApiResult<Json<ApiResponse<DownloadResponse>>> {
    let file = state.drive.download_file(&user, id).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}
