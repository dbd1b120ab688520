//! Health check endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Status response.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> ApiResult<Json<StatusResponse>> {
    state.store.health_check().await?;
    Ok(Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
