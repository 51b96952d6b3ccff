//! HTTP gateway. Each sibling module exports a subrouter; this module merges
//! them and attaches the shared [`Orchestrator`] as state, so `main.rs`
//! needs to know nothing about individual endpoints.

use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::orchestrator::{FleetError, Orchestrator};
use crate::settings::SettingsError;

mod alerts;
mod health;
mod notifications;
mod plants;
mod settings;

// ---

pub type AppState = Arc<Orchestrator>;

pub fn router(orchestrator: AppState) -> Router {
    // ---
    Router::new()
        .merge(plants::router())
        .merge(notifications::router())
        .merge(alerts::router())
        .merge(settings::router())
        .merge(health::router())
        .with_state(orchestrator)
}

/// Error response with a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // ---
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<FleetError> for ApiError {
    fn from(e: FleetError) -> Self {
        // ---
        let status = match &e {
            FleetError::PlantNotFound(_) | FleetError::NotificationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            FleetError::MissingField(_) | FleetError::InvalidThreshold(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FleetError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        // ---
        let status = match &e {
            SettingsError::InvalidMoistureThreshold(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SettingsError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}
