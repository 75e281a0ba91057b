//! Marine forecast tool backed by a premium provider.
//!
//! Unlike the forecast tool, the provider is keyed; the API key is a
//! tool-level setting supplied by the administrator, while display options
//! come from the per-user settings record.

use chrono::{DateTime, Utc};
use plume_host::{emit, reply, StatusSink, UserRecord};
use serde::Deserialize;

use crate::geocode::GeoClient;
use crate::locate::parse_coordinate_pair;
use crate::types::WeatherError;
use crate::units::kmh_to_knots;
use crate::when::{resolve_date, resolve_hour_key};

const MARINE_URL: &str = "http://api.worldweatheronline.com/premium/v1/marine.ashx";

/// Forecast time intervals the provider understands, in hours.
const VALID_INTERVALS: [u8; 5] = [1, 3, 6, 12, 24];

/// Tool-level settings, shared across users.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarineToolSettings {
    /// API key for the marine provider.
    pub api_key: String,

    /// Ask the host to attach a citation to the response.
    pub citation: bool,
}

impl Default for MarineToolSettings {
    fn default() -> Self {
        Self { api_key: String::new(), citation: true }
    }
}

/// Per-user settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarineSettings {
    /// Include the nearest weather point in the response.
    pub include_location: bool,

    /// Forecast time intervals in hours; each must be one of 1, 3, 6, 12, 24.
    pub intervals: Option<Vec<u8>>,

    /// Include tide data when available.
    pub tide: bool,

    /// Response language for condition text.
    pub language: Option<String>,

    /// Return a JSON `{"message": ...}` object instead of plain text.
    pub structured_output: bool,

    /// Extra tracing detail.
    pub debug: bool,
}

impl Default for MarineSettings {
    fn default() -> Self {
        Self {
            include_location: false,
            intervals: None,
            tide: false,
            language: None,
            structured_output: true,
            debug: false,
        }
    }
}

impl MarineSettings {
    /// Reject out-of-enum intervals before any network call.
    fn validate(&self) -> Result<(), WeatherError> {
        if let Some(intervals) = &self.intervals {
            for interval in intervals {
                if !VALID_INTERVALS.contains(interval) {
                    return Err(WeatherError::InvalidParameter(format!(
                        "forecast interval {} (expected one of 1, 3, 6, 12 or 24)",
                        interval
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct MarineResponse {
    data: MarineData,
}

#[derive(Debug, Default, Deserialize)]
struct MarineData {
    #[serde(default)]
    weather: Vec<MarineDay>,
}

#[derive(Debug, Deserialize)]
struct MarineDay {
    date: String,
    #[serde(default)]
    astronomy: Vec<Astronomy>,
    #[serde(default)]
    hourly: Vec<MarineHour>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Astronomy {
    #[serde(default)]
    sunrise: Option<String>,
    #[serde(default)]
    sunset: Option<String>,
}

/// The provider serializes every number as a string.
#[derive(Debug, Deserialize)]
struct MarineHour {
    time: String,
    #[serde(rename = "tempC")]
    temp_c: String,
    #[serde(rename = "waterTemp_C")]
    water_temp_c: String,
    #[serde(rename = "windspeedKmph")]
    windspeed_kmph: String,
    #[serde(rename = "winddir16Point")]
    winddir_16_point: String,
    #[serde(rename = "swellHeight_m")]
    swell_height_m: String,
    #[serde(rename = "swellDir16Point")]
    swell_dir_16_point: String,
    #[serde(rename = "swellPeriod_secs")]
    swell_period_secs: String,
    pressure: String,
    humidity: String,
    #[serde(rename = "weatherDesc", default)]
    weather_desc: Vec<TextValue>,

    /// Localized description arrays arrive as "lang_<code>" keys.
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

impl MarineHour {
    /// Hour key zero-padded to "HHMM".
    fn hour_key(&self) -> String {
        format!("{:0>4}", self.time)
    }

    /// Condition text, localized when the response carries the requested
    /// language.
    fn description(&self, language: Option<&str>) -> Option<String> {
        if let Some(lang) = language {
            let localized = self
                .extra
                .get(&format!("lang_{}", lang))
                .and_then(|v| v.as_array())
                .and_then(|texts| texts.first())
                .and_then(|t| t.get("value"))
                .and_then(|v| v.as_str());
            if let Some(text) = localized {
                return Some(text.to_string());
            }
        }
        self.weather_desc.first().map(|t| t.value.clone())
    }

    fn render(&self, language: Option<&str>) -> Vec<String> {
        let key = self.hour_key();
        let hour_label = format!("{}:{}", &key[..2], &key[2..]);
        let wind = self
            .windspeed_kmph
            .parse::<f64>()
            .map(|kmh| format!("{:.1}", kmh_to_knots(kmh)))
            .unwrap_or_else(|_| "N/A".to_string());
        vec![
            format!("\n— {} —", hour_label),
            format!("Temp: {} °C | Water: {} °C", self.temp_c, self.water_temp_c),
            format!("Wind: {} knots ({})", wind, self.winddir_16_point),
            format!(
                "Swell: {} m {} {}s",
                self.swell_height_m, self.swell_dir_16_point, self.swell_period_secs
            ),
            format!("Pressure: {} hPa | Humidity: {}%", self.pressure, self.humidity),
            format!(
                "Weather: {}",
                self.description(language).unwrap_or_else(|| "Unknown weather".to_string())
            ),
        ]
    }
}

/// The marine forecast tool.
#[derive(Debug, Clone)]
pub struct MarineTool {
    settings: MarineToolSettings,
    geo: GeoClient,
    client: reqwest::Client,
    marine_url: String,
}

impl MarineTool {
    pub fn new(settings: MarineToolSettings) -> Self {
        Self {
            settings,
            geo: GeoClient::new(),
            client: reqwest::Client::new(),
            marine_url: MARINE_URL.to_string(),
        }
    }

    /// Build against specific endpoints (integration tests).
    pub fn with_endpoints(settings: MarineToolSettings, geo: GeoClient, marine_url: &str) -> Self {
        Self {
            settings,
            geo,
            client: reqwest::Client::new(),
            marine_url: marine_url.to_string(),
        }
    }

    /// Tool entry point. Same error-to-message policy as the forecast tool.
    pub async fn marine_weather(
        &self,
        location: &str,
        date: Option<&str>,
        hour: Option<&str>,
        user: Option<&UserRecord>,
        sink: Option<&dyn StatusSink>,
        now: DateTime<Utc>,
    ) -> String {
        let settings: MarineSettings =
            user.map(UserRecord::settings_or_default).unwrap_or_default();
        if settings.debug {
            tracing::debug!(location, "marine query");
        }

        match self.run(location, date, hour, &settings, sink, now).await {
            Ok(report) => {
                emit(sink, "Marine weather retrieval complete.", true);
                reply(report, settings.structured_output)
            }
            Err(e) => {
                let message = e.to_string();
                emit(sink, message.clone(), true);
                reply(message, settings.structured_output)
            }
        }
    }

    async fn run(
        &self,
        location: &str,
        date: Option<&str>,
        hour: Option<&str>,
        settings: &MarineSettings,
        sink: Option<&dyn StatusSink>,
        now: DateTime<Utc>,
    ) -> Result<String, WeatherError> {
        settings.validate()?;
        if self.settings.api_key.is_empty() {
            return Err(WeatherError::InvalidParameter(
                "marine provider API key (not configured)".to_string(),
            ));
        }

        let (latitude, longitude, resolved_name) = match parse_coordinate_pair(location) {
            Some((latitude, longitude)) => {
                (latitude, longitude, format!("{}, {}", latitude, longitude))
            }
            None => {
                emit(sink, format!("Fetching location data for '{location}'..."), false);
                let candidates = self.geo.search(location, 1).await?;
                let first = candidates
                    .first()
                    .ok_or_else(|| WeatherError::LocationNotFound(location.to_string()))?;
                (first.latitude, first.longitude, first.name.clone())
            }
        };
        emit(
            sink,
            format!("Location resolved: {resolved_name}. Fetching forecast data..."),
            false,
        );

        let mut url = format!(
            "{}?key={}&q={},{}&format=json",
            self.marine_url, self.settings.api_key, latitude, longitude
        );
        if let Some(intervals) = &settings.intervals {
            for interval in intervals {
                url.push_str(&format!("&tp={}", interval));
            }
        }
        if let Some(lang) = &settings.language {
            url.push_str(&format!("&lang={}", lang));
        }
        url.push_str(if settings.tide { "&tide=yes" } else { "&tide=no" });
        url.push_str(if settings.include_location {
            "&includeLocation=yes"
        } else {
            "&includeLocation=no"
        });

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!("Marine endpoint returned status {}", response.status());
            return Err(WeatherError::ForecastUnavailable);
        }
        let payload: MarineResponse = response
            .json()
            .await
            .map_err(|_| WeatherError::ForecastUnavailable)?;
        if payload.data.weather.is_empty() {
            return Err(WeatherError::MissingWeatherData);
        }

        let language = settings.language.as_deref();
        let parser_language = language.unwrap_or("en");
        let requested_date = date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .and_then(|d| resolve_date(d, parser_language, now))
            .map(|d| d.format("%Y-%m-%d").to_string());
        let requested_hour = hour
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(|h| resolve_hour_key(h, parser_language, now));

        let mut report = Vec::new();
        for day in &payload.data.weather {
            if let Some(requested) = &requested_date {
                if &day.date != requested {
                    continue;
                }
            }
            let astronomy = day.astronomy.first().cloned().unwrap_or_default();
            report.push(format!("Date: {}", day.date));
            report.push(format!(
                "Sunrise: {} | Sunset: {}",
                astronomy.sunrise.as_deref().unwrap_or("?"),
                astronomy.sunset.as_deref().unwrap_or("?")
            ));
            for hourly in &day.hourly {
                if let Some(key) = &requested_hour {
                    if &hourly.hour_key() != key {
                        continue;
                    }
                }
                report.extend(hourly.render(language));
            }
        }
        if report.is_empty() {
            return Err(WeatherError::NoForecastData);
        }
        Ok(report.join("\n"))
    }
}
