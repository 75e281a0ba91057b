//! Shared types and settings for the weather tools.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::{TemperatureUnit, UnitSystem, WindSpeedUnit};

/// Coordinates plus a display name, produced by the location resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Weather tool errors.
///
/// The `Display` form of every variant is the user-visible message: entry
/// points never surface these to the host, they format them into the reply.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Error: Location '{0}' not found.")]
    LocationNotFound(String),

    #[error("Error: Invalid {0}.")]
    InvalidParameter(String),

    #[error("Error: Could not get geolocation data.")]
    GeocodingUnavailable,

    #[error("Error: Could not get weather data.")]
    ForecastUnavailable,

    #[error("Error: Weather data not available.")]
    MissingWeatherData,

    #[error("Error: No forecast data available for the requested time.")]
    NoForecastData,

    #[error("An error occurred: {0}")]
    Http(#[from] reqwest::Error),
}

/// Per-user settings for the forecast tool, read fresh on every call.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub temperature_unit: TemperatureUnit,

    /// Wind speed unit as a settings string ("km/h", "m/s", "mph", "knots").
    pub wind_speed_unit: String,

    /// General distance/pressure unit system.
    pub unit_system: UnitSystem,

    /// Display only city and country, omitting the region.
    pub shorten_location: bool,

    pub show_humidity: bool,
    pub show_precipitation: bool,
    pub show_wind: bool,
    pub show_visibility: bool,
    pub show_pressure: bool,
    pub show_cloud_cover: bool,
    pub show_uv_index: bool,
    pub show_sun_times: bool,

    /// Language hint for natural-language date expressions ("en", "fr", ...).
    pub language: String,

    /// Return a JSON `{"message": ...}` object instead of plain text.
    pub structured_output: bool,

    /// Ask the host to attach a citation to the response.
    pub citation: bool,

    /// Extra tracing detail.
    pub debug: bool,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            wind_speed_unit: "km/h".to_string(),
            unit_system: UnitSystem::default(),
            shorten_location: false,
            show_humidity: true,
            show_precipitation: true,
            show_wind: true,
            show_visibility: false,
            show_pressure: false,
            show_cloud_cover: false,
            show_uv_index: false,
            show_sun_times: false,
            language: "en".to_string(),
            structured_output: true,
            citation: true,
            debug: false,
        }
    }
}

impl WeatherSettings {
    /// Wind unit resolved from the settings string, with the system default
    /// as fallback.
    pub fn wind_unit(&self) -> WindSpeedUnit {
        WindSpeedUnit::from_setting(&self.wind_speed_unit, self.unit_system)
    }
}

/// Human-readable description for a weather condition code.
pub fn weather_code_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown weather",
    }
}
