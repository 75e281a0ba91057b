//! Unit preferences and fixed conversion factors.

use serde::{Deserialize, Serialize};

/// Temperature unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Symbol appended to report values.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
            Self::Kelvin => "K",
        }
    }
}

/// Wind speed unit preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Kmh,
    Ms,
    Mph,
    Knots,
}

impl WindSpeedUnit {
    /// Parse a settings string; anything unrecognized falls back to the
    /// system default (mph for imperial, km/h otherwise).
    pub fn from_setting(value: &str, system: UnitSystem) -> Self {
        match value.trim().to_lowercase().as_str() {
            "km/h" | "kmh" => Self::Kmh,
            "m/s" | "ms" => Self::Ms,
            "mph" => Self::Mph,
            "knots" | "kn" => Self::Knots,
            _ => {
                if system.is_imperial() {
                    Self::Mph
                } else {
                    Self::Kmh
                }
            }
        }
    }

    /// Unit code understood by the forecast API.
    pub fn api_code(self) -> &'static str {
        match self {
            Self::Kmh => "kmh",
            Self::Ms => "ms",
            Self::Mph => "mph",
            Self::Knots => "kn",
        }
    }

    /// Symbol appended to report values.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Kmh => "km/h",
            Self::Ms => "m/s",
            Self::Mph => "mph",
            Self::Knots => "kn",
        }
    }
}

/// General distance/pressure unit system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn is_imperial(self) -> bool {
        self == Self::Imperial
    }

    /// Symbol for precipitation amounts.
    pub fn precipitation_symbol(self) -> &'static str {
        if self.is_imperial() {
            "inch"
        } else {
            "mm"
        }
    }
}

pub const KMH_TO_MPH: f64 = 0.621371;
pub const KMH_TO_KNOTS: f64 = 0.539957;
pub const CELSIUS_TO_KELVIN_OFFSET: f64 = 273.15;

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * KMH_TO_MPH
}

pub fn kmh_to_knots(kmh: f64) -> f64 {
    kmh * KMH_TO_KNOTS
}

pub fn knots_to_kmh(knots: f64) -> f64 {
    knots / KMH_TO_KNOTS
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + CELSIUS_TO_KELVIN_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wind_conversion_to_knots() {
        let knots = kmh_to_knots(10.0);
        assert!((knots - 5.4).abs() < 0.1, "expected ~5.4, got {knots}");
    }

    #[test]
    fn test_wind_conversion_round_trip() {
        let original = 10.0;
        let round_tripped = knots_to_kmh(kmh_to_knots(original));
        assert!((round_tripped - original).abs() < 0.1);
    }

    #[test]
    fn test_wind_conversion_to_mph() {
        assert!((kmh_to_mph(100.0) - 62.1371).abs() < 1e-9);
    }

    #[test]
    fn test_kelvin_offset() {
        assert!((celsius_to_kelvin(0.0) - 273.15).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wind_unit_from_setting() {
        assert_eq!(WindSpeedUnit::from_setting("km/h", UnitSystem::Metric), WindSpeedUnit::Kmh);
        assert_eq!(WindSpeedUnit::from_setting("M/S", UnitSystem::Metric), WindSpeedUnit::Ms);
        assert_eq!(WindSpeedUnit::from_setting("Knots", UnitSystem::Metric), WindSpeedUnit::Knots);
        assert_eq!(WindSpeedUnit::from_setting("mph", UnitSystem::Metric), WindSpeedUnit::Mph);
    }

    #[test]
    fn test_wind_unit_fallback_tracks_system() {
        assert_eq!(
            WindSpeedUnit::from_setting("furlongs", UnitSystem::Metric),
            WindSpeedUnit::Kmh
        );
        assert_eq!(
            WindSpeedUnit::from_setting("furlongs", UnitSystem::Imperial),
            WindSpeedUnit::Mph
        );
    }

    #[test]
    fn test_api_codes() {
        assert_eq!(WindSpeedUnit::Kmh.api_code(), "kmh");
        assert_eq!(WindSpeedUnit::Knots.api_code(), "kn");
    }

    #[test]
    fn test_precipitation_symbols() {
        assert_eq!(UnitSystem::Metric.precipitation_symbol(), "mm");
        assert_eq!(UnitSystem::Imperial.precipitation_symbol(), "inch");
    }
}
