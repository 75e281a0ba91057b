//! Forecast fetch and hourly record selection.

use serde::Deserialize;

use crate::types::{WeatherError, WeatherSettings};
use crate::units::TemperatureUnit;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Hourly fields requested on every call.
const CORE_HOURLY_FIELDS: [&str; 7] = [
    "apparent_temperature",
    "relativehumidity_2m",
    "precipitation",
    "windspeed_10m",
    "winddirection_10m",
    "weathercode",
    "temperature_2m",
];

/// Hourly fields to request, the core set plus settings-gated extras.
pub fn hourly_fields(settings: &WeatherSettings) -> Vec<&'static str> {
    let mut fields = CORE_HOURLY_FIELDS.to_vec();
    if settings.show_humidity {
        fields.push("dewpoint_2m");
    }
    if settings.show_precipitation {
        fields.push("precipitation_probability");
    }
    if settings.show_visibility {
        fields.push("visibility");
    }
    if settings.show_pressure {
        fields.push("surface_pressure");
    }
    if settings.show_cloud_cover {
        fields.push("cloudcover");
    }
    fields
}

/// Daily fields to request; may be empty.
pub fn daily_fields(settings: &WeatherSettings) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if settings.show_uv_index {
        fields.push("uv_index_max");
    }
    if settings.show_sun_times {
        fields.extend(["sunrise", "sunset"]);
    }
    fields
}

/// Raw hourly series: parallel arrays keyed by ISO hour timestamps. The
/// upstream emits `null` for missing samples, hence the `Option` elements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HourlySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub windspeed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub winddirection_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i64>>,
    #[serde(default)]
    pub dewpoint_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub visibility: Vec<Option<f64>>,
    #[serde(default)]
    pub surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    pub cloudcover: Vec<Option<f64>>,
}

/// Raw daily series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
}

/// Current conditions block; presence is what the tool checks, the report
/// itself reads hourly samples.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub windspeed: Option<f64>,
    #[serde(default)]
    pub winddirection: Option<f64>,
    #[serde(default)]
    pub weathercode: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current_weather: Option<CurrentWeather>,
    #[serde(default)]
    pub hourly: Option<HourlySeries>,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

/// Sample a parallel array at the selected index.
pub fn sample(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

/// Index of the hourly record for the target hour key ("YYYY-MM-DDTHH:00").
///
/// Exact match first; then the latest record sharing the target's
/// date-and-hour prefix (upstream timestamps are occasionally misaligned);
/// then the nearest later hour; then the latest record overall. `None` only
/// for an empty series.
pub fn select_hour_index(times: &[String], target: &str) -> Option<usize> {
    if let Some(index) = times.iter().position(|t| t == target) {
        return Some(index);
    }
    tracing::debug!("Exact hour {} not found, falling back", target);

    let prefix = target.get(..13).unwrap_or(target);
    if let Some(index) = times
        .iter()
        .enumerate()
        .filter(|(_, t)| t.starts_with(prefix))
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
    {
        return Some(index);
    }

    if let Some(index) = times
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() > target)
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
    {
        return Some(index);
    }

    times
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
}

/// Index of the daily record matching the target date, defaulting to the
/// first record.
pub fn select_daily_index(times: &[String], target_date: &str) -> usize {
    times.iter().position(|t| t == target_date).unwrap_or(0)
}

/// Client for the forecast endpoint.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: FORECAST_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (integration tests).
    pub fn with_endpoint(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch the forecast for resolved coordinates, parameterized by the
    /// settings-selected fields and units.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        settings: &WeatherSettings,
    ) -> Result<ForecastResponse, WeatherError> {
        let mut params: Vec<(&str, String)> = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", hourly_fields(settings).join(",")),
            ("timezone", "auto".to_string()),
            ("wind_speed_unit", settings.wind_unit().api_code().to_string()),
        ];
        let daily = daily_fields(settings);
        if !daily.is_empty() {
            params.push(("daily", daily.join(",")));
        }
        // The upstream serves celsius unless told otherwise; kelvin is
        // derived from celsius at the report layer.
        if settings.temperature_unit == TemperatureUnit::Fahrenheit {
            params.push(("temperature_unit", "fahrenheit".to_string()));
        }
        if settings.unit_system.is_imperial() {
            params.push(("precipitation_unit", "inch".to_string()));
        }

        let response = self.client.get(&self.base_url).query(&params).send().await?;
        if !response.status().is_success() {
            tracing::warn!("Forecast endpoint returned status {}", response.status());
            return Err(WeatherError::ForecastUnavailable);
        }
        response
            .json()
            .await
            .map_err(|_| WeatherError::ForecastUnavailable)
    }
}
