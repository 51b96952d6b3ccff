//! Alerts page endpoints, backed by the notification list.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::alerts::{self, Alert, AlertBoard, AlertFilter};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/alerts", get(list).delete(clear))
        .route("/alerts/{id}", delete(remove))
        .route("/alerts/{id}/resolve", post(resolve))
}

#[derive(Debug, Deserialize)]
struct ClearQuery {
    resolved: bool,
}

async fn list(
    State(orchestrator): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> Json<AlertBoard> {
    // ---
    let notifications = orchestrator.notifications().await;
    Json(alerts::board(&notifications, &filter, Utc::now()))
}

async fn resolve(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Alert>, ApiError> {
    // ---
    let notification = orchestrator.resolve_notification(&id).await?;
    Ok(Json(Alert::from_notification(&notification, Utc::now())))
}

async fn remove(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    orchestrator.dismiss_notification(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Clear every resolved (`?resolved=true`) or every active alert.
async fn clear(
    State(orchestrator): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> Result<Json<Value>, ApiError> {
    // ---
    let removed = orchestrator
        .remove_notifications(|n| n.resolved == query.resolved)
        .await?;
    Ok(Json(json!({ "removed": removed })))
}
