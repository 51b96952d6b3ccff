use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio_test::assert_ok;

use plant_care::{routes, Orchestrator, PlantStore};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlantCard {
    id: String,
    name: String,
    moisture: f64,
    water_tank_level: f64,
    last_watered: DateTime<Utc>,
    auto_water_enabled: bool,
    auto_water_threshold: f64,
    status: String,
}

#[derive(Debug, Deserialize)]
struct Notification {
    id: String,
    #[serde(rename = "plantId")]
    plant_id: String,
    message: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertBoard {
    active_count: usize,
    resolved_count: usize,
    critical_count: usize,
}

/// Serve the app on an ephemeral port with demo plants in a memory store.
async fn spawn_app() -> Result<String> {
    // ---
    let orchestrator =
        Orchestrator::load(PlantStore::in_memory(), StdRng::seed_from_u64(7), true).await?;
    let app = routes::router(Arc::new(orchestrator));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn dashboard_lists_demo_plants() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let plants: Vec<PlantCard> = client.get(format!("{base}/plants")).send().await?.json().await?;
    assert_eq!(plants.len(), 3);

    let names: Vec<_> = plants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Monstera", "Snake Plant", "Pothos"]);
    assert_eq!(plants[0].status, "good");
    assert_eq!(plants[1].status, "warning");
    assert_eq!(plants[2].status, "danger");

    let summary: serde_json::Value = client.get(format!("{base}/summary")).send().await?.json().await?;
    assert_eq!(summary["plantCount"], 3);
    assert_eq!(summary["averageMoisture"], 39);
    assert_eq!(summary["unreadNotifications"], 2);

    let health: serde_json::Value = client.get(format!("{base}/health")).send().await?.json().await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"], "memory");

    Ok(())
}

#[tokio::test]
async fn water_now_and_auto_water_settings() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();
    let before = Utc::now();

    // Monstera: moisture 65, tank 85.
    let watered: PlantCard = client
        .post(format!("{base}/plants/1/water"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(watered.moisture, 95.0);
    assert_eq!(watered.water_tank_level, 75.0);
    assert!(watered.last_watered >= before);

    let updated: PlantCard = client
        .put(format!("{base}/plants/3/auto-water"))
        .json(&json!({ "enabled": true, "threshold": 40 }))
        .send()
        .await?
        .json()
        .await?;
    assert!(updated.auto_water_enabled);
    assert_eq!(updated.auto_water_threshold, 40.0);

    let bad = client
        .put(format!("{base}/plants/3/auto-water"))
        .json(&json!({ "enabled": true, "threshold": 140 }))
        .send()
        .await?;
    assert_eq!(bad.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = client.post(format!("{base}/plants/nope/water")).send().await?;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let history: Vec<serde_json::Value> = client
        .get(format!("{base}/plants/1/history?days=3"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(history.len(), 4);

    Ok(())
}

#[tokio::test]
async fn add_plant_requires_name_and_type() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let blank = client
        .post(format!("{base}/plants"))
        .json(&json!({ "name": "", "type": "Ficus lyrata" }))
        .send()
        .await?;
    assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let created = client
        .post(format!("{base}/plants"))
        .json(&json!({ "name": "Fiddle Leaf Fig", "type": "Ficus lyrata", "location": "outdoor" }))
        .send()
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let plant: PlantCard = created.json().await?;
    assert!(!plant.id.is_empty());
    assert_eq!(plant.status, "good");

    let plants: Vec<PlantCard> = client.get(format!("{base}/plants")).send().await?.json().await?;
    assert_eq!(plants.len(), 4);

    Ok(())
}

#[tokio::test]
async fn notifications_and_alerts_share_state() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let notifications: Vec<Notification> = client
        .get(format!("{base}/notifications"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(notifications.len(), 2);

    let danger = notifications
        .iter()
        .find(|n| n.kind == "danger")
        .expect("Pothos should be in danger");
    assert_eq!(danger.plant_id, "3");
    assert!(danger.message.contains("critically low"));

    let board: AlertBoard = client.get(format!("{base}/alerts")).send().await?.json().await?;
    assert_eq!((board.active_count, board.resolved_count, board.critical_count), (2, 0, 1));

    let resolved = client
        .post(format!("{base}/alerts/{}/resolve", danger.id))
        .send()
        .await?;
    assert_eq!(resolved.status(), StatusCode::OK);

    let board: AlertBoard = client
        .get(format!("{base}/alerts?type=moisture&severity=critical"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!((board.active_count, board.resolved_count), (0, 1));

    let cleared: serde_json::Value = client
        .delete(format!("{base}/alerts?resolved=true"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(cleared["removed"], 1);

    let remaining: Vec<Notification> = client
        .get(format!("{base}/notifications"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(remaining.len(), 1);

    let dismissed = client
        .delete(format!("{base}/notifications/{}", remaining[0].id))
        .send()
        .await?;
    assert_eq!(dismissed.status(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn settings_save_and_reset() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let defaults: serde_json::Value = client.get(format!("{base}/settings")).send().await?.json().await?;
    assert_eq!(defaults["theme"], "light");
    assert_eq!(defaults["preferences"]["moistureThreshold"], 30);

    let mut changed = defaults.clone();
    changed["theme"] = json!("dark");
    changed["preferences"]["temperatureUnit"] = json!("fahrenheit");
    let saved = client.put(format!("{base}/settings")).json(&changed).send().await?;
    assert_eq!(saved.status(), StatusCode::OK);

    let current: serde_json::Value = client.get(format!("{base}/settings")).send().await?.json().await?;
    assert_eq!(current, changed);

    let reset: serde_json::Value = client
        .post(format!("{base}/settings/reset"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(reset, defaults);

    Ok(())
}

#[tokio::test]
async fn plant_cards_follow_temperature_unit() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    // Monstera reads 22.0 °C.
    let card: serde_json::Value = client.get(format!("{base}/plants/1")).send().await?.json().await?;
    assert_eq!(card["temperature"], 22.0);
    assert_eq!(card["displayTemperature"], 22.0);
    assert_eq!(card["temperatureUnit"], "celsius");

    let mut settings: serde_json::Value = client.get(format!("{base}/settings")).send().await?.json().await?;
    settings["preferences"]["temperatureUnit"] = json!("fahrenheit");
    let saved = client.put(format!("{base}/settings")).json(&settings).send().await?;
    assert_eq!(saved.status(), StatusCode::OK);

    let card: serde_json::Value = client.get(format!("{base}/plants/1")).send().await?.json().await?;
    assert_eq!(card["temperature"], 22.0);
    assert_eq!(card["displayTemperature"], 71.6);
    assert_eq!(card["temperatureUnit"], "fahrenheit");

    Ok(())
}

#[tokio::test]
async fn reset_clears_all_plant_data() -> Result<()> {
    // ---
    let base = spawn_app().await?;
    let client = Client::new();

    let resp = assert_ok!(client.delete(format!("{base}/data")).send().await);
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let plants: Vec<PlantCard> = client.get(format!("{base}/plants")).send().await?.json().await?;
    assert!(plants.is_empty());

    let notifications: Vec<Notification> = client
        .get(format!("{base}/notifications"))
        .send()
        .await?
        .json()
        .await?;
    assert!(notifications.is_empty());

    Ok(())
}
