//! Simulation loop and plant-fleet state.
//!
//! [`Orchestrator`] owns the in-memory plants and notifications behind one
//! async mutex. Every mutation (a tick or a user action) holds the lock for
//! the whole "apply, derive notifications, persist" step, so mutations never
//! interleave and the stored snapshot always matches memory after a
//! successful step.
//!
//! [`Orchestrator::start`] spawns the periodic tick and returns a [`Ticker`]
//! whose [`Ticker::stop`] cancels it between ticks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::models::{
    HistoryPoint, Location, NewPlant, Notification, NotificationCategory, NotificationKind, Plant,
    PlantStatus,
};
use crate::simulator::{self, round_tenth};
use crate::storage::{PlantStore, StoreError};

// ---

/// Default period between ticks.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(8);

/// Auto-watering needs strictly more than this in the tank.
pub const AUTO_WATER_MIN_TANK: f64 = 5.0;
const AUTO_WATER_MOISTURE: f64 = 25.0;
const AUTO_WATER_TANK_COST: f64 = 5.0;

const MANUAL_WATER_MOISTURE: f64 = 30.0;
const MANUAL_WATER_TANK_COST: f64 = 10.0;

/// Tank level below which a refill notification is raised.
pub const LOW_TANK_LEVEL: f64 = 20.0;

const DEFAULT_IMAGE: &str = "plant1.jpg";

#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("plant not found: {0}")]
    PlantNotFound(String),

    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("auto-water threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(f64),

    #[error("failed to persist state: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub plants: usize,
    pub auto_watered: usize,
    pub new_alerts: usize,
}

/// Dashboard header figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub plant_count: usize,
    /// Mean moisture rounded to a whole percent, 0 with no plants.
    pub average_moisture: u32,
    pub unread_notifications: usize,
    pub good: usize,
    pub warning: usize,
    pub danger: usize,
}

struct Fleet {
    plants: Vec<Plant>,
    notifications: Vec<Notification>,
    rng: StdRng,
}

pub struct Orchestrator {
    store: PlantStore,
    state: Mutex<Fleet>,
    ticks: AtomicU64,
}

impl Orchestrator {
    /// Restore the fleet from `store`.
    ///
    /// With `seed_demo` set and no stored plants, three demo plants are
    /// created. The threshold pass runs once and the result is persisted.
    pub async fn load(
        store: PlantStore,
        rng: StdRng,
        seed_demo: bool,
    ) -> Result<Self, FleetError> {
        // ---
        let mut plants = store.load_plants().await;
        let notifications = store.load_notifications().await;
        let now = Utc::now();

        if plants.is_empty() && seed_demo {
            plants = demo_plants(now);
            info!(count = plants.len(), "seeded demo plants");
        }

        info!(
            plants = plants.len(),
            notifications = notifications.len(),
            backend = store.backend_name(),
            "fleet loaded"
        );

        let orchestrator = Self {
            store,
            state: Mutex::new(Fleet {
                plants,
                notifications,
                rng,
            }),
            ticks: AtomicU64::new(0),
        };

        {
            let mut fleet = orchestrator.state.lock().await;
            orchestrator.commit(&mut fleet, now).await?;
        }

        Ok(orchestrator)
    }

    pub fn store(&self) -> &PlantStore {
        &self.store
    }

    /// Number of ticks completed since construction.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Advance every plant by one simulated reading.
    #[tracing::instrument(skip(self))]
    pub async fn tick(&self) -> Result<TickReport, FleetError> {
        // ---
        let mut guard = self.state.lock().await;
        let fleet = &mut *guard;
        let now = Utc::now();
        let mut auto_watered = 0;

        for plant in fleet.plants.iter_mut() {
            let reading = simulator::next_reading(plant, &mut fleet.rng);
            plant.apply_reading(&reading);

            if let Some(notification) = auto_water(plant, now) {
                debug!(plant = %plant.id, "auto-watered");
                fleet.notifications.insert(0, notification);
                auto_watered += 1;
            }
        }

        let new_alerts = self.commit(fleet, now).await?;
        self.ticks.fetch_add(1, Ordering::Relaxed);

        Ok(TickReport {
            plants: fleet.plants.len(),
            auto_watered,
            new_alerts,
        })
    }

    /// Water a plant immediately, regardless of its auto-water settings.
    pub async fn water_now(&self, plant_id: &str) -> Result<Plant, FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        let now = Utc::now();

        let plant = find_plant(&mut fleet.plants, plant_id)?;
        plant.moisture = round_tenth((plant.moisture + MANUAL_WATER_MOISTURE).min(100.0));
        plant.water_tank_level =
            round_tenth((plant.water_tank_level - MANUAL_WATER_TANK_COST).max(0.0));
        plant.last_watered = now;
        let updated = plant.clone();

        self.commit(&mut fleet, now).await?;
        info!(plant = %updated.id, moisture = updated.moisture, "watered");
        Ok(updated)
    }

    /// Change auto-watering settings; used from the next tick on.
    pub async fn update_auto_water(
        &self,
        plant_id: &str,
        enabled: bool,
        threshold: f64,
    ) -> Result<Plant, FleetError> {
        // ---
        if !(0.0..=100.0).contains(&threshold) {
            return Err(FleetError::InvalidThreshold(threshold));
        }

        let mut fleet = self.state.lock().await;
        let plant = find_plant(&mut fleet.plants, plant_id)?;
        plant.auto_water_enabled = enabled;
        plant.auto_water_threshold = threshold;
        let updated = plant.clone();

        self.commit(&mut fleet, Utc::now()).await?;
        Ok(updated)
    }

    /// Add a plant with random initial readings. Name and type are required.
    pub async fn add_plant(&self, request: NewPlant) -> Result<Plant, FleetError> {
        // ---
        let name = request.name.trim();
        let plant_type = request.plant_type.trim();
        if name.is_empty() {
            return Err(FleetError::MissingField("name"));
        }
        if plant_type.is_empty() {
            return Err(FleetError::MissingField("type"));
        }

        let mut fleet = self.state.lock().await;
        let now = Utc::now();
        let (reading, last_watered) = simulator::initial_reading(now, &mut fleet.rng);

        let mut plant = Plant {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            plant_type: plant_type.to_string(),
            location: request.location,
            image: request.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            moisture: 0.0,
            temperature: 0.0,
            light: 0.0,
            water_tank_level: 0.0,
            last_watered,
            auto_water_enabled: false,
            auto_water_threshold: 30.0,
        };
        plant.apply_reading(&reading);

        fleet.plants.push(plant.clone());
        self.commit(&mut fleet, now).await?;

        info!(plant = %plant.id, name = %plant.name, "plant added");
        Ok(plant)
    }

    pub async fn plants(&self) -> Vec<Plant> {
        self.state.lock().await.plants.clone()
    }

    pub async fn plant(&self, plant_id: &str) -> Result<Plant, FleetError> {
        // ---
        let fleet = self.state.lock().await;
        fleet
            .plants
            .iter()
            .find(|p| p.id == plant_id)
            .cloned()
            .ok_or_else(|| FleetError::PlantNotFound(plant_id.to_string()))
    }

    /// Synthetic moisture chart ending at the plant's current moisture.
    ///
    /// `days` is capped at [`simulator::MAX_HISTORY_DAYS`].
    pub async fn history(&self, plant_id: &str, days: u32) -> Result<Vec<HistoryPoint>, FleetError> {
        // ---
        let mut guard = self.state.lock().await;
        let fleet = &mut *guard;
        let moisture = fleet
            .plants
            .iter()
            .find(|p| p.id == plant_id)
            .map(|p| p.moisture)
            .ok_or_else(|| FleetError::PlantNotFound(plant_id.to_string()))?;

        let today = Utc::now().date_naive();
        Ok(simulator::history(moisture, days, today, &mut fleet.rng))
    }

    /// Notifications, newest first.
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifications.clone()
    }

    pub async fn dismiss_notification(&self, notification_id: &str) -> Result<(), FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        let before = fleet.notifications.len();
        fleet.notifications.retain(|n| n.id != notification_id);
        if fleet.notifications.len() == before {
            return Err(FleetError::NotificationNotFound(notification_id.to_string()));
        }

        self.persist_notifications(&fleet).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<Notification, FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        let notification = find_notification(&mut fleet.notifications, notification_id)?;
        notification.read = true;
        let updated = notification.clone();

        self.persist_notifications(&fleet).await?;
        Ok(updated)
    }

    /// Mark every notification read; returns how many changed.
    pub async fn mark_all_read(&self) -> Result<usize, FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        let mut changed = 0;
        for n in fleet.notifications.iter_mut().filter(|n| !n.read) {
            n.read = true;
            changed += 1;
        }

        if changed > 0 {
            self.persist_notifications(&fleet).await?;
        }
        Ok(changed)
    }

    /// Mark a notification resolved (and read). A resolved notification no
    /// longer blocks a new one of the same category for its plant.
    pub async fn resolve_notification(
        &self,
        notification_id: &str,
    ) -> Result<Notification, FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        let notification = find_notification(&mut fleet.notifications, notification_id)?;
        notification.resolved = true;
        notification.read = true;
        let updated = notification.clone();

        self.persist_notifications(&fleet).await?;
        Ok(updated)
    }

    /// Drop every notification for which `remove` is true; returns the count.
    pub async fn remove_notifications<F>(&self, remove: F) -> Result<usize, FleetError>
    where
        F: Fn(&Notification) -> bool,
    {
        // ---
        let mut fleet = self.state.lock().await;
        let before = fleet.notifications.len();
        fleet.notifications.retain(|n| !remove(n));
        let removed = before - fleet.notifications.len();

        if removed > 0 {
            self.persist_notifications(&fleet).await?;
        }
        Ok(removed)
    }

    pub async fn clear_notifications(&self) -> Result<usize, FleetError> {
        self.remove_notifications(|_| true).await
    }

    /// Remove all stored plant data and empty the fleet.
    pub async fn reset(&self) -> Result<(), FleetError> {
        // ---
        let mut fleet = self.state.lock().await;
        fleet.plants.clear();
        fleet.notifications.clear();

        // Memory is empty even when a record survives; the next commit
        // overwrites it.
        if let Err(e) = self.store.clear_all_data().await {
            error!(backend = self.store.backend_name(), "stored data not fully cleared: {}", e);
            return Err(e.into());
        }

        warn!("all plant data cleared");
        Ok(())
    }

    pub async fn summary(&self) -> Summary {
        // ---
        let fleet = self.state.lock().await;
        let plants = &fleet.plants;

        let average_moisture = if plants.is_empty() {
            0
        } else {
            let total: f64 = plants.iter().map(|p| p.moisture).sum();
            (total / plants.len() as f64).round() as u32
        };

        let count = |status: PlantStatus| {
            plants
                .iter()
                .filter(|p| simulator::status(p.moisture) == status)
                .count()
        };

        Summary {
            plant_count: plants.len(),
            average_moisture,
            unread_notifications: fleet.notifications.iter().filter(|n| !n.read).count(),
            good: count(PlantStatus::Good),
            warning: count(PlantStatus::Warning),
            danger: count(PlantStatus::Danger),
        }
    }

    /// Spawn the periodic tick. The first tick fires one `period` from now.
    pub fn start(self: &Arc<Self>, period: Duration) -> Ticker {
        // ---
        let (shutdown, mut stop_rx) = watch::channel(false);
        let orchestrator = Arc::clone(self);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_ms = period.as_millis() as u64, "ticker started");

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = interval.tick() => {}
                }

                // Outside the select so a running tick is never dropped halfway.
                match orchestrator.tick().await {
                    Ok(report) => debug!(?report, "tick complete"),
                    Err(e) => error!("tick failed: {}", e),
                }
            }

            info!("ticker stopped");
        });

        Ticker { shutdown, handle }
    }

    /// Derive threshold notifications and persist both collections.
    async fn commit(&self, fleet: &mut Fleet, now: DateTime<Utc>) -> Result<usize, FleetError> {
        // ---
        let created = threshold_pass(&fleet.plants, &mut fleet.notifications, now);

        let saved = match self.store.save_plants(&fleet.plants).await {
            Ok(()) => self.store.save_notifications(&fleet.notifications).await,
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            error!(backend = self.store.backend_name(), "failed to persist fleet: {}", e);
            return Err(e.into());
        }

        Ok(created)
    }

    async fn persist_notifications(&self, fleet: &Fleet) -> Result<(), FleetError> {
        // ---
        self.store
            .save_notifications(&fleet.notifications)
            .await
            .map_err(|e| {
                error!("failed to persist notifications: {}", e);
                FleetError::from(e)
            })
    }
}

/// Handle to the spawned ticker.
pub struct Ticker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Stop ticking and wait for the task to finish.
    pub async fn stop(self) {
        // ---
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!("ticker task ended abnormally: {}", e);
        }
    }
}

// ---

/// Water `plant` when its auto-water policy applies, returning the info
/// notification that records it.
fn auto_water(plant: &mut Plant, now: DateTime<Utc>) -> Option<Notification> {
    // ---
    if !plant.auto_water_enabled
        || plant.moisture >= plant.auto_water_threshold
        || plant.water_tank_level <= AUTO_WATER_MIN_TANK
    {
        return None;
    }

    let before = plant.moisture;
    plant.moisture = round_tenth((plant.moisture + AUTO_WATER_MOISTURE).min(100.0));
    plant.water_tank_level = round_tenth((plant.water_tank_level - AUTO_WATER_TANK_COST).max(0.0));
    plant.last_watered = now;

    Some(Notification::new(
        plant,
        NotificationKind::Info,
        NotificationCategory::AutoWater,
        format!("Auto-watered (moisture was {before:.1}%)"),
        now,
    ))
}

/// Create moisture and water-tank notifications for plants that need them.
///
/// At most one unresolved notification per `(plant, category)` exists
/// afterwards. Returns the number created; new ones go to the front.
pub fn threshold_pass(
    plants: &[Plant],
    notifications: &mut Vec<Notification>,
    now: DateTime<Utc>,
) -> usize {
    // ---
    let mut created = 0;

    for plant in plants {
        let has_open = |notifications: &[Notification], category: NotificationCategory| {
            notifications.iter().any(|n| n.is_open_for(&plant.id, category))
        };

        let status = simulator::status(plant.moisture);
        if status != PlantStatus::Good && !has_open(&notifications[..], NotificationCategory::Moisture) {
            let (kind, message) = match status {
                PlantStatus::Danger => (
                    NotificationKind::Danger,
                    format!("Moisture is critically low at {:.1}%", plant.moisture),
                ),
                _ => (
                    NotificationKind::Warning,
                    format!("Moisture is low at {:.1}%", plant.moisture),
                ),
            };
            notifications.insert(
                0,
                Notification::new(plant, kind, NotificationCategory::Moisture, message, now),
            );
            created += 1;
        }

        if plant.water_tank_level < LOW_TANK_LEVEL
            && !has_open(&notifications[..], NotificationCategory::WaterTank)
        {
            notifications.insert(
                0,
                Notification::new(
                    plant,
                    NotificationKind::Warning,
                    NotificationCategory::WaterTank,
                    format!("Water tank is low at {:.1}%", plant.water_tank_level),
                    now,
                ),
            );
            created += 1;
        }
    }

    created
}

fn find_plant<'a>(plants: &'a mut [Plant], plant_id: &str) -> Result<&'a mut Plant, FleetError> {
    plants
        .iter_mut()
        .find(|p| p.id == plant_id)
        .ok_or_else(|| FleetError::PlantNotFound(plant_id.to_string()))
}

fn find_notification<'a>(
    notifications: &'a mut [Notification],
    notification_id: &str,
) -> Result<&'a mut Notification, FleetError> {
    notifications
        .iter_mut()
        .find(|n| n.id == notification_id)
        .ok_or_else(|| FleetError::NotificationNotFound(notification_id.to_string()))
}

/// The three plants a fresh installation starts with.
fn demo_plants(now: DateTime<Utc>) -> Vec<Plant> {
    // ---
    let demo = |id: &str,
                name: &str,
                plant_type: &str,
                image: &str,
                (moisture, temperature, light, tank): (f64, f64, f64, f64),
                days_since_watered: i64,
                auto_water_enabled: bool| Plant {
        id: id.to_string(),
        name: name.to_string(),
        plant_type: plant_type.to_string(),
        location: Location::Indoor,
        image: image.to_string(),
        moisture,
        temperature,
        light,
        water_tank_level: tank,
        last_watered: now - chrono::Duration::days(days_since_watered),
        auto_water_enabled,
        auto_water_threshold: 30.0,
    };

    vec![
        demo("1", "Monstera", "Monstera deliciosa", "plant1.jpg", (65.0, 22.0, 800.0, 85.0), 2, false),
        demo("2", "Snake Plant", "Sansevieria", "plant2.jpg", (35.0, 21.0, 600.0, 70.0), 5, true),
        demo("3", "Pothos", "Epipremnum aureum", "plant3.jpg", (18.0, 23.0, 750.0, 45.0), 7, false),
    ]
}
