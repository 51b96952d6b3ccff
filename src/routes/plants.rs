//! Dashboard and plant-details endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiError, AppState};
use crate::models::{NewPlant, Plant, PlantStatus};
use crate::settings::{self, TemperatureUnit};
use crate::simulator::{self, DEFAULT_HISTORY_DAYS};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/plants", get(list_plants).post(add_plant))
        .route("/plants/{id}", get(get_plant))
        .route("/plants/{id}/water", post(water_now))
        .route("/plants/{id}/auto-water", put(update_auto_water))
        .route("/plants/{id}/history", get(history))
        .route("/summary", get(summary))
        .route("/data", delete(reset))
}

/// A plant as shown on its card: the record, its moisture status and the
/// temperature in the preferred unit. The stored `temperature` stays Celsius.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlantCard {
    #[serde(flatten)]
    plant: Plant,
    status: PlantStatus,
    display_temperature: f64,
    temperature_unit: TemperatureUnit,
}

impl PlantCard {
    fn new(plant: Plant, unit: TemperatureUnit) -> Self {
        // ---
        Self {
            status: simulator::status(plant.moisture),
            display_temperature: unit.display(plant.temperature),
            temperature_unit: unit,
            plant,
        }
    }
}

async fn temperature_unit(orchestrator: &AppState) -> TemperatureUnit {
    settings::current(orchestrator.store())
        .await
        .preferences
        .temperature_unit
}

#[derive(Debug, Deserialize)]
struct AutoWaterRequest {
    enabled: bool,
    threshold: f64,
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    days: Option<u32>,
}

async fn list_plants(State(orchestrator): State<AppState>) -> Json<Vec<PlantCard>> {
    let unit = temperature_unit(&orchestrator).await;
    let plants = orchestrator.plants().await;
    Json(plants.into_iter().map(|p| PlantCard::new(p, unit)).collect())
}

async fn add_plant(
    State(orchestrator): State<AppState>,
    Json(request): Json<NewPlant>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let plant = orchestrator.add_plant(request).await?;
    let unit = temperature_unit(&orchestrator).await;
    Ok((StatusCode::CREATED, Json(PlantCard::new(plant, unit))))
}

async fn get_plant(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantCard>, ApiError> {
    // ---
    let plant = orchestrator.plant(&id).await?;
    let unit = temperature_unit(&orchestrator).await;
    Ok(Json(PlantCard::new(plant, unit)))
}

async fn water_now(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantCard>, ApiError> {
    // ---
    let plant = orchestrator.water_now(&id).await?;
    let unit = temperature_unit(&orchestrator).await;
    Ok(Json(PlantCard::new(plant, unit)))
}

async fn update_auto_water(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AutoWaterRequest>,
) -> Result<Json<PlantCard>, ApiError> {
    // ---
    let plant = orchestrator
        .update_auto_water(&id, request.enabled, request.threshold)
        .await?;
    let unit = temperature_unit(&orchestrator).await;
    Ok(Json(PlantCard::new(plant, unit)))
}

async fn history(
    State(orchestrator): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // ---
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    Ok(Json(orchestrator.history(&id, days).await?))
}

async fn summary(State(orchestrator): State<AppState>) -> impl IntoResponse {
    Json(orchestrator.summary().await)
}

async fn reset(State(orchestrator): State<AppState>) -> Result<StatusCode, ApiError> {
    // ---
    orchestrator.reset().await?;
    info!("DELETE /data - store cleared");
    Ok(StatusCode::NO_CONTENT)
}
