//! User settings record, persisted under its own key on explicit save.

use serde::{Deserialize, Serialize};

use crate::simulator::round_tenth;
use crate::storage::{PlantStore, StoreError};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert a Celsius reading into this unit.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }

    /// A Celsius reading converted and rounded to one decimal for display.
    pub fn display(self, celsius: f64) -> f64 {
        round_tenth(self.from_celsius(celsius))
    }
}

/// Notification delivery channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channels {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for Channels {
    fn default() -> Self {
        Self {
            email: true,
            push: false,
            sms: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub language: Language,
    pub temperature_unit: TemperatureUnit,
    /// Alert when moisture drops below this, 0-100 %.
    pub moisture_threshold: u8,
    pub auto_watering: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: Language::En,
            temperature_unit: TemperatureUnit::Celsius,
            moisture_threshold: 30,
            auto_watering: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub notifications: Channels,
    pub preferences: Preferences,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("moisture threshold must be between 0 and 100, got {0}")]
    InvalidMoistureThreshold(u8),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        // ---
        let threshold = self.preferences.moisture_threshold;
        if threshold > 100 {
            return Err(SettingsError::InvalidMoistureThreshold(threshold));
        }
        Ok(())
    }
}

/// Settings as currently stored, or the defaults.
pub async fn current(store: &PlantStore) -> Settings {
    store.load_settings().await
}

/// Validate and persist.
pub async fn save(store: &PlantStore, settings: &Settings) -> Result<(), SettingsError> {
    // ---
    settings.validate()?;
    store.save_settings(settings).await?;
    tracing::info!(theme = ?settings.theme, "settings saved");
    Ok(())
}

/// The default settings. Nothing is written until the caller saves.
pub fn reset() -> Settings {
    Settings::default()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_defaults_match_record_shape() {
        // ---
        let json = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "theme": "light",
                "notifications": { "email": true, "push": false, "sms": false },
                "preferences": {
                    "language": "en",
                    "temperatureUnit": "celsius",
                    "moistureThreshold": 30,
                    "autoWatering": false
                }
            })
        );
    }

    #[test]
    fn test_fahrenheit_conversion() {
        // ---
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(20.0), 68.0);
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius(100.0), 212.0);
        assert_eq!(TemperatureUnit::Celsius.from_celsius(22.0), 22.0);
    }

    #[test]
    fn test_display_temperature_is_rounded() {
        // ---
        assert_eq!(TemperatureUnit::Fahrenheit.display(22.0), 71.6);
        assert_eq!(TemperatureUnit::Fahrenheit.display(21.3), 70.3);
        assert_eq!(TemperatureUnit::Celsius.display(22.0), 22.0);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        // ---
        let store = PlantStore::in_memory();
        let mut settings = Settings::default();
        settings.theme = Theme::Dark;
        settings.preferences.temperature_unit = TemperatureUnit::Fahrenheit;
        settings.notifications.sms = true;

        save(&store, &settings).await.unwrap();
        assert_eq!(current(&store).await, settings);
    }

    #[tokio::test]
    async fn test_invalid_threshold_is_not_saved() {
        // ---
        let store = PlantStore::in_memory();
        let mut settings = Settings::default();
        settings.preferences.moisture_threshold = 140;

        let err = save(&store, &settings).await.unwrap_err();
        assert!(matches!(err, SettingsError::InvalidMoistureThreshold(140)));
        assert_eq!(current(&store).await, Settings::default());
    }

    #[tokio::test]
    async fn test_reset_does_not_persist() {
        // ---
        let store = PlantStore::in_memory();
        let mut settings = Settings::default();
        settings.theme = Theme::Auto;
        save(&store, &settings).await.unwrap();

        assert_eq!(reset(), Settings::default());
        assert_eq!(current(&store).await.theme, Theme::Auto);
    }
}
