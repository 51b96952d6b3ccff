// src/routes/health.rs
//! Liveness endpoint.
//!
//! Reports the storage backend and how many simulation ticks have run, which
//! is enough for a container probe or a smoke test to see that the ticker
//! is alive. It does not take the fleet lock.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    store: String,
    ticks: u64,
}

/// Handle `GET /health`.
async fn health(State(orchestrator): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: orchestrator.store().backend_name().to_string(),
        ticks: orchestrator.tick_count(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
