//! Settings page endpoints.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use super::{ApiError, AppState};
use crate::settings::{self, Settings};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/settings", get(current).put(save))
        .route("/settings/reset", post(reset))
}

async fn current(State(orchestrator): State<AppState>) -> Json<Settings> {
    Json(settings::current(orchestrator.store()).await)
}

async fn save(
    State(orchestrator): State<AppState>,
    Json(new_settings): Json<Settings>,
) -> Result<Json<Settings>, ApiError> {
    // ---
    settings::save(orchestrator.store(), &new_settings).await?;
    Ok(Json(new_settings))
}

/// Defaults for the form; the client saves them explicitly.
async fn reset() -> Json<Settings> {
    Json(settings::reset())
}
