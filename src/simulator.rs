//! Synthetic sensor source.
//!
//! Every function here is pure apart from the random generator passed in,
//! so a seeded `StdRng` makes a simulation step reproducible.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;

use crate::models::{HistoryPoint, Plant, PlantStatus, SensorReading};

// ---

pub const MOISTURE_RANGE: (f64, f64) = (0.0, 100.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (10.0, 40.0);
pub const LIGHT_RANGE: (f64, f64) = (0.0, 2000.0);
pub const TANK_RANGE: (f64, f64) = (0.0, 100.0);

/// Moisture at or above this is healthy.
pub const GOOD_MOISTURE: f64 = 40.0;
/// Moisture below this is critical.
pub const DANGER_MOISTURE: f64 = 20.0;

const MOISTURE_STEP: f64 = 3.0; // ±1.5 %
const TEMPERATURE_STEP: f64 = 1.0; // ±0.5 °C
const LIGHT_STEP: f64 = 50.0; // ±25 lux
const TANK_DRAIN_MAX: f64 = 0.5;

const HISTORY_START_SPREAD: f64 = 20.0;
const HISTORY_STEP: f64 = 10.0;
const HISTORY_RANGE: (f64, f64) = (15.0, 85.0);

/// Default length of the moisture chart, in days.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;
/// Longest chart [`history`] produces.
pub const MAX_HISTORY_DAYS: u32 = 90;

fn clamp(value: f64, (lo, hi): (f64, f64)) -> f64 {
    value.max(lo).min(hi)
}

/// Round to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Centered perturbation in `[-width/2, width/2)`.
fn jitter<R: Rng + ?Sized>(rng: &mut R, width: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * width
}

/// Produce the next reading for a plant.
///
/// Moisture, temperature and light drift independently; the tank only
/// drains. Each value is clamped to its range before rounding, so the
/// output stays in range for any input.
pub fn next_reading<R: Rng + ?Sized>(plant: &Plant, rng: &mut R) -> SensorReading {
    // ---
    let moisture = clamp(plant.moisture + jitter(rng, MOISTURE_STEP), MOISTURE_RANGE);
    let temperature = clamp(
        plant.temperature + jitter(rng, TEMPERATURE_STEP),
        TEMPERATURE_RANGE,
    );
    let light = clamp(plant.light + jitter(rng, LIGHT_STEP), LIGHT_RANGE);
    let tank = clamp(
        plant.water_tank_level - rng.gen::<f64>() * TANK_DRAIN_MAX,
        TANK_RANGE,
    );

    SensorReading {
        moisture: round_tenth(moisture),
        temperature: round_tenth(temperature),
        light: light.round(),
        water_tank_level: round_tenth(tank),
    }
}

/// Classify a moisture percentage.
pub fn status(moisture: f64) -> PlantStatus {
    if moisture >= GOOD_MOISTURE {
        PlantStatus::Good
    } else if moisture >= DANGER_MOISTURE {
        PlantStatus::Warning
    } else {
        PlantStatus::Danger
    }
}

/// Synthetic moisture history for the details chart.
///
/// Returns `days + 1` points, oldest first, the last one dated `today`.
/// `days` above [`MAX_HISTORY_DAYS`] is capped.
pub fn history<R: Rng + ?Sized>(
    current_moisture: f64,
    days: u32,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    // ---
    let days = days.min(MAX_HISTORY_DAYS);
    let mut moisture = current_moisture + jitter(rng, HISTORY_START_SPREAD);
    let mut points = Vec::with_capacity(days as usize + 1);

    for offset in (0..=days).rev() {
        let date = today - Duration::days(i64::from(offset));
        moisture = clamp(moisture + jitter(rng, HISTORY_STEP), HISTORY_RANGE);

        points.push(HistoryPoint {
            date,
            label: date.format("%b %-d").to_string(),
            moisture: round_tenth(moisture),
        });
    }

    points
}

/// Random sensor values and last-watered time for a newly added plant.
pub fn initial_reading<R: Rng + ?Sized>(
    now: DateTime<Utc>,
    rng: &mut R,
) -> (SensorReading, DateTime<Utc>) {
    // ---
    let reading = SensorReading {
        moisture: round_tenth(rng.gen_range(30.0..70.0)),
        temperature: round_tenth(rng.gen_range(18.0..28.0)),
        light: rng.gen_range(500.0_f64..1500.0).round(),
        water_tank_level: round_tenth(rng.gen_range(60.0..100.0)),
    };
    let week_ms = 7 * 24 * 60 * 60 * 1000;
    let last_watered = now - Duration::milliseconds(rng.gen_range(0..week_ms));

    (reading, last_watered)
}
