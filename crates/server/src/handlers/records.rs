//! Active-record CRUD endpoints.
//!
//! The four entity kinds share one set of handlers keyed by the path's
//! collection name. Deletion is not a plain removal: it routes through the
//! trash bin's cascade engine, which is the only way a record becomes
//! deleted.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use paulocell_core::{Customer, Device, Document, EntityKind, Service};
use serde_json::Value;

pub(crate) fn parse_kind(raw: &str) -> ApiResult<EntityKind> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("unknown entity kind '{raw}'")))
}

/// Reject records the typed model cannot represent, so nothing malformed
/// ever lands in a collection.
fn validate_record(kind: EntityKind, value: &Value) -> ApiResult<()> {
    let result = match kind {
        EntityKind::Customer => serde_json::from_value::<Customer>(value.clone()).map(drop),
        EntityKind::Device => serde_json::from_value::<Device>(value.clone()).map(drop),
        EntityKind::Service => serde_json::from_value::<Service>(value.clone()).map(drop),
        EntityKind::Document => serde_json::from_value::<Document>(value.clone()).map(drop),
    };
    result.map_err(|e| ApiError::BadRequest(format!("invalid {kind} record: {e}")))
}

/// GET /api/{kind}
pub async fn list_records(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let kind = parse_kind(&kind)?;
    Ok(Json(state.store.get_collection(kind.active()).await?))
}

/// POST /api/{kind}
///
/// Records without an `id` get a generated UUID.
pub async fn create_record(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(mut record): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let kind = parse_kind(&kind)?;
    let Some(fields) = record.as_object_mut() else {
        return Err(ApiError::BadRequest("record must be a JSON object".into()));
    };
    if !fields.contains_key("id") {
        fields.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
    }
    validate_record(kind, &record)?;

    state.store.append(kind.active(), record.clone()).await?;
    tracing::info!(kind = %kind, id = record["id"].as_str().unwrap_or(""), "Record created");
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/{kind}/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let kind = parse_kind(&kind)?;
    let records = state.store.get_collection(kind.active()).await?;
    records
        .into_iter()
        .find(|r| r["id"].as_str() == Some(id.as_str()))
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{kind} '{id}' not found")))
}

/// PUT /api/{kind}/{id}
///
/// Full replacement; the path id wins over any id in the body.
pub async fn update_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(mut record): Json<Value>,
) -> ApiResult<Json<Value>> {
    let kind = parse_kind(&kind)?;
    let Some(fields) = record.as_object_mut() else {
        return Err(ApiError::BadRequest("record must be a JSON object".into()));
    };
    fields.insert("id".into(), Value::String(id.clone()));
    validate_record(kind, &record)?;

    let mut records = state.store.get_collection(kind.active()).await?;
    let Some(slot) = records
        .iter_mut()
        .find(|r| r["id"].as_str() == Some(id.as_str()))
    else {
        return Err(ApiError::NotFound(format!("{kind} '{id}' not found")));
    };
    *slot = record.clone();
    state.store.put_collection(kind.active(), records).await?;

    tracing::info!(kind = %kind, id, "Record updated");
    Ok(Json(record))
}

/// DELETE /api/{kind}/{id}
///
/// Soft delete through the cascade engine; the record and its dependents
/// move to the shadow collections.
pub async fn delete_record(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&kind)?;
    let moved = match kind {
        EntityKind::Customer => state.trash.try_move_customer_to_trash(&id).await?,
        EntityKind::Device => state.trash.try_move_device_to_trash(&id).await?,
        EntityKind::Service => state.trash.try_move_service_to_trash(&id).await?,
        EntityKind::Document => state.trash.try_move_document_to_trash(&id).await?,
    };
    if !moved {
        return Err(ApiError::NotFound(format!("{kind} '{id}' not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
