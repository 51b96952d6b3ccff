//! Notification panel endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::models::Notification;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/notifications", get(list).delete(clear))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}", delete(dismiss))
        .route("/notifications/{id}/read", post(mark_read))
}

/// Newest first.
async fn list(State(orchestrator): State<AppState>) -> Json<Vec<Notification>> {
    Json(orchestrator.notifications().await)
}

async fn clear(State(orchestrator): State<AppState>) -> Result<Json<Value>, ApiError> {
    let removed = orchestrator.clear_notifications().await?;
    Ok(Json(json!({ "removed": removed })))
}

async fn dismiss(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    orchestrator.dismiss_notification(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_read(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(orchestrator.mark_read(&id).await?))
}

async fn mark_all_read(State(orchestrator): State<AppState>) -> Result<Json<Value>, ApiError> {
    let updated = orchestrator.mark_all_read().await?;
    Ok(Json(json!({ "updated": updated })))
}
