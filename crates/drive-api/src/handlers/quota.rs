//! Storage quota handlers.

use axum::Json;
use axum::extract::State;

use drive_entity::quota::QuotaSnapshot;

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::ActingUser;
use crate::state::AppState;

/// GET /api/drive/storage/quota
pub async fn get_quota(
    State(state): State<AppState>,
    user: ActingUser,
) -> ApiResult<Json<ApiResponse<QuotaSnapshot>>> {
    let snapshot = state.drive.quota_snapshot(&user).await?;
    Ok(Json(ApiResponse::ok(snapshot)))
}
