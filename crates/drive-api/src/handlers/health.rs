//! Health check handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database) = match state.stores.health_check().await {
        Ok(true) => (StatusCode::OK, "connected"),
        Ok(false) => (StatusCode::SERVICE_UNAVAILABLE, "unreachable"),
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: format!("{:?}", state.stores.backend()).to_lowercase(),
        database: database.to_string(),
    };
    (status, Json(ApiResponse::ok(body)))
}
