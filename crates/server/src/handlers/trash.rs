//! Trash-bin endpoints: listing, restore, purge and on-demand sweep.

use crate::error::{ApiError, ApiResult};
use crate::handlers::records::parse_kind;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use paulocell_core::EntityKind;
use serde::Serialize;
use serde_json::Value;

/// GET /api/trash/{kind}
pub async fn list_trash(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.store.get_collection(kind.trash()).await?))
}

/// POST /api/trash/{kind}/{id}/restore
pub async fn restore_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let restored = match kind {
        EntityKind::Customer => state.trash.try_restore_customer_from_trash(&id).await?,
        EntityKind::Device => state.trash.try_restore_device_from_trash(&id).await?,
        EntityKind::Service => state.trash.try_restore_service_from_trash(&id).await?,
        EntityKind::Document => state.trash.try_restore_document_from_trash(&id).await?,
    };
    if !restored {
        return Err(ApiError::NotFound(format!("{kind} '{id}' not in trash")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/trash/{kind}/{id}
///
/// Permanent and irreversible.
pub async fn purge_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let purged = match kind {
        EntityKind::Customer => state.trash.try_permanently_delete_customer(&id).await?,
        EntityKind::Device => state.trash.try_permanently_delete_device(&id).await?,
        EntityKind::Service => state.trash.try_permanently_delete_service(&id).await?,
        EntityKind::Document => state.trash.try_permanently_delete_document(&id).await?,
    };
    if !purged {
        return Err(ApiError::NotFound(format!("{kind} '{id}' not in trash")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Cleanup response.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub customers: usize,
    pub devices: usize,
    pub services: usize,
    pub documents: usize,
    pub total: usize,
}

/// POST /api/trash/cleanup
///
/// Runs one retention sweep immediately, regardless of the background
/// sweeper's schedule.
pub async fn run_cleanup(State(state): State<AppState>) -> ApiResult<Json<CleanupResponse>> {
    let stats = state.trash.try_cleanup_expired().await?;
    Ok(Json(CleanupResponse {
        customers: stats.customers,
        devices: stats.devices,
        services: stats.services,
        documents: stats.documents,
        total: stats.total(),
    }))
}
