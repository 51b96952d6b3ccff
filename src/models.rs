//! Data models for plants, sensor readings and notifications.
//!
//! Field names serialize in camelCase so the persisted records keep the
//! shape of the `plants` / `notifications` collections. Timestamps are
//! `DateTime<Utc>` and travel as RFC 3339 strings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Where a plant lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Indoor,
    Outdoor,
}

/// A monitored plant with its latest simulated readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    // ---
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: String,
    pub location: Location,
    pub image: String,

    /// Soil moisture, 0-100 %.
    pub moisture: f64,
    /// Air temperature in °C, 10-40.
    pub temperature: f64,
    /// Light level in lux, 0-2000, integer valued.
    pub light: f64,
    /// Reservoir level, 0-100 %.
    pub water_tank_level: f64,

    pub last_watered: DateTime<Utc>,
    pub auto_water_enabled: bool,
    /// Auto-watering fires when moisture drops below this, 0-100 %.
    pub auto_water_threshold: f64,
}

impl Plant {
    /// Copy a fresh reading into the sensor fields.
    pub fn apply_reading(&mut self, reading: &SensorReading) {
        self.moisture = reading.moisture;
        self.temperature = reading.temperature;
        self.light = reading.light;
        self.water_tank_level = reading.water_tank_level;
    }
}

/// Request body for adding a plant. Sensor values are generated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlant {
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub image: Option<String>,
}

/// One set of simulated sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub moisture: f64,
    pub temperature: f64,
    pub light: f64,
    pub water_tank_level: f64,
}

/// Moisture classification used for card colouring and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    Good,
    Warning,
    Danger,
}

/// One point of the synthetic moisture chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    /// Short display label, e.g. "Oct 19".
    pub label: String,
    pub moisture: f64,
}

// ---

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Warning,
    Danger,
    Info,
}

/// Condition a notification reports. Together with the plant id this is
/// the de-duplication key: at most one unresolved notification per
/// `(plant_id, category)` is created by the threshold pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    Moisture,
    WaterTank,
    AutoWater,
    #[default]
    General,
}

/// A dismissible record of a condition detected for one plant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    // ---
    pub id: String,
    pub plant_id: String,
    pub plant_name: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub category: NotificationCategory,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default)]
    pub resolved: bool,
}

impl Notification {
    pub fn new(
        plant: &Plant,
        kind: NotificationKind,
        category: NotificationCategory,
        message: String,
        timestamp: DateTime<Utc>,
    ) -> Self {
        // ---
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            plant_id: plant.id.clone(),
            plant_name: plant.name.clone(),
            message,
            kind,
            category,
            timestamp,
            read: false,
            resolved: false,
        }
    }

    /// Whether this notification still occupies its de-duplication slot.
    pub fn is_open_for(&self, plant_id: &str, category: NotificationCategory) -> bool {
        !self.resolved && self.plant_id == plant_id && self.category == category
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn sample_plant() -> Plant {
        // ---
        Plant {
            id: "1".to_string(),
            name: "Monstera".to_string(),
            plant_type: "Monstera deliciosa".to_string(),
            location: Location::Indoor,
            image: "plant1.jpg".to_string(),
            moisture: 65.0,
            temperature: 22.0,
            light: 800.0,
            water_tank_level: 85.0,
            last_watered: Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap(),
            auto_water_enabled: false,
            auto_water_threshold: 30.0,
        }
    }

    #[test]
    fn test_plant_serializes_camel_case() {
        // ---
        let json = serde_json::to_value(sample_plant()).unwrap();

        assert_eq!(json["type"], "Monstera deliciosa");
        assert_eq!(json["location"], "indoor");
        assert_eq!(json["waterTankLevel"], 85.0);
        assert_eq!(json["autoWaterEnabled"], false);
        assert_eq!(json["lastWatered"], "2025-03-26T18:45:00Z");
    }

    #[test]
    fn test_last_watered_revived_as_timestamp() {
        // ---
        let json = serde_json::to_string(&sample_plant()).unwrap();
        let back: Plant = serde_json::from_str(&json).unwrap();

        assert_eq!(
            back.last_watered,
            Utc.with_ymd_and_hms(2025, 3, 26, 18, 45, 0).unwrap()
        );
        assert_eq!(back, sample_plant());
    }

    #[test]
    fn test_notification_without_category_defaults() {
        // ---
        let json = r#"{
            "id": "n1",
            "plantId": "1",
            "plantName": "Monstera",
            "message": "Moisture is low at 25%",
            "type": "warning",
            "timestamp": "2025-01-01T12:00:00Z",
            "read": false
        }"#;

        let notif: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notif.kind, NotificationKind::Warning);
        assert_eq!(notif.category, NotificationCategory::General);
        assert!(!notif.resolved);
    }

    #[test]
    fn test_open_slot_matching() {
        // ---
        let plant = sample_plant();
        let mut notif = Notification::new(
            &plant,
            NotificationKind::Danger,
            NotificationCategory::Moisture,
            "Moisture is critically low at 12%".to_string(),
            Utc::now(),
        );

        assert!(notif.is_open_for("1", NotificationCategory::Moisture));
        assert!(!notif.is_open_for("1", NotificationCategory::WaterTank));
        assert!(!notif.is_open_for("2", NotificationCategory::Moisture));

        notif.resolved = true;
        assert!(!notif.is_open_for("1", NotificationCategory::Moisture));
    }

    #[test]
    fn test_new_plant_defaults() {
        // ---
        let req: NewPlant =
            serde_json::from_str(r#"{"name": "Fern", "type": "Nephrolepis"}"#).unwrap();

        assert_eq!(req.location, Location::Indoor);
        assert!(req.image.is_none());
    }
}
