//! Display-unit preferences and conversion of raw telemetry values.
//!
//! The telemetry API reports speeds in kilometres per hour and temperatures
//! in Kelvin. Conversion happens on the client, at render time, according to
//! the user's saved preferences.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::variables::VariableCategory;

/// 1 km/h expressed in knots.
pub const KMH_TO_KNOTS: f64 = 0.539957;
/// 1 km/h expressed in metres per second.
pub const KMH_TO_METERS_PER_SECOND: f64 = 1.0 / 3.6;
pub const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    KilometersPerHour,
    Knots,
    MetersPerSecond,
}

impl SpeedUnit {
    pub const ALL: [SpeedUnit; 3] = [
        SpeedUnit::KilometersPerHour,
        SpeedUnit::Knots,
        SpeedUnit::MetersPerSecond,
    ];

    pub fn from_kmh(self, kmh: f64) -> f64 {
        match self {
            SpeedUnit::KilometersPerHour => kmh,
            SpeedUnit::Knots => kmh * KMH_TO_KNOTS,
            SpeedUnit::MetersPerSecond => kmh * KMH_TO_METERS_PER_SECOND,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::KilometersPerHour => "km/h",
            SpeedUnit::Knots => "kn",
            SpeedUnit::MetersPerSecond => "m/s",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    pub const ALL: [TemperatureUnit; 3] = [
        TemperatureUnit::Celsius,
        TemperatureUnit::Fahrenheit,
        TemperatureUnit::Kelvin,
    ];

    pub fn from_kelvin(self, kelvin: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => kelvin - KELVIN_OFFSET,
            TemperatureUnit::Fahrenheit => (kelvin - KELVIN_OFFSET) * 9.0 / 5.0 + 32.0,
            TemperatureUnit::Kelvin => kelvin,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
            TemperatureUnit::Kelvin => "K",
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// User display-unit choices, persisted client-side as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitPreferences {
    pub speed: SpeedUnit,
    pub temperature: TemperatureUnit,
}

impl UnitPreferences {
    pub fn convert(&self, category: VariableCategory, raw: f64) -> f64 {
        match category {
            VariableCategory::Speed => self.speed.from_kmh(raw),
            VariableCategory::Temperature => self.temperature.from_kelvin(raw),
            VariableCategory::Latitude | VariableCategory::Longitude | VariableCategory::Other => {
                raw
            }
        }
    }

    /// Unit symbol for a converted category, `None` for pass-through values.
    pub fn symbol(&self, category: VariableCategory) -> Option<&'static str> {
        match category {
            VariableCategory::Speed => Some(self.speed.symbol()),
            VariableCategory::Temperature => Some(self.temperature.symbol()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn speed_from_kmh() {
        assert!(close(SpeedUnit::KilometersPerHour.from_kmh(18.52), 18.52));
        assert!(close(SpeedUnit::Knots.from_kmh(18.52), 10.0000036));
        assert!(close(SpeedUnit::MetersPerSecond.from_kmh(36.0), 10.0));
    }

    #[test]
    fn temperature_from_kelvin() {
        assert!(close(TemperatureUnit::Celsius.from_kelvin(293.15), 20.0));
        assert!(close(TemperatureUnit::Fahrenheit.from_kelvin(273.15), 32.0));
        assert!(close(TemperatureUnit::Fahrenheit.from_kelvin(373.15), 212.0));
        assert!(close(TemperatureUnit::Kelvin.from_kelvin(300.0), 300.0));
    }

    #[test]
    fn preferences_dispatch_on_category() {
        let preferences = UnitPreferences {
            speed: SpeedUnit::Knots,
            temperature: TemperatureUnit::Celsius,
        };
        assert!(close(preferences.convert(VariableCategory::Speed, 10.0), 5.39957));
        assert!(close(preferences.convert(VariableCategory::Temperature, 283.15), 10.0));
        assert!(close(preferences.convert(VariableCategory::Other, 42.0), 42.0));
        assert!(close(preferences.convert(VariableCategory::Latitude, 45.1), 45.1));
        assert_eq!(preferences.symbol(VariableCategory::Speed), Some("kn"));
        assert_eq!(preferences.symbol(VariableCategory::Other), None);
    }

    #[test]
    fn stored_preferences_tolerate_missing_fields() {
        let parsed: UnitPreferences = serde_json::from_str(r#"{"speed":"knots"}"#).unwrap();
        assert_eq!(parsed.speed, SpeedUnit::Knots);
        assert_eq!(parsed.temperature, TemperatureUnit::Celsius);

        let round_trip = serde_json::to_string(&parsed).unwrap();
        assert_eq!(round_trip, r#"{"speed":"knots","temperature":"celsius"}"#);
    }
}
