//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // Static /api/trash segments take priority over the {kind} captures.
    Router::new()
        .route("/api/status", get(handlers::get_status))
        .route("/api/trash/cleanup", post(handlers::run_cleanup))
        .route("/api/trash/{kind}", get(handlers::list_trash))
        .route("/api/trash/{kind}/{id}", delete(handlers::purge_record))
        .route(
            "/api/trash/{kind}/{id}/restore",
            post(handlers::restore_record),
        )
        .route(
            "/api/{kind}",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/api/{kind}/{id}",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
