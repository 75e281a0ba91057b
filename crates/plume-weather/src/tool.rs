//! Forecast tool entry point.

use chrono::{DateTime, Utc};
use plume_host::{emit, reply, RequestMetadata, StatusSink, UserRecord};

use crate::forecast::{sample, select_daily_index, select_hour_index, ForecastClient};
use crate::geocode::GeoClient;
use crate::locate::resolve_location;
use crate::report::{format_report, WeatherReport};
use crate::types::{WeatherError, WeatherSettings};
use crate::when::{resolve_datetime, target_hour_string};

/// Free-form query arguments as the model supplies them. All parts are
/// optional; empty strings mean "not provided".
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherQuery<'a> {
    pub location: &'a str,
    pub date: &'a str,
    pub hour: &'a str,
}

/// The forecast tool: location and time resolution, forecast fetch, and
/// unit-aware report rendering.
#[derive(Debug, Clone, Default)]
pub struct WeatherTool {
    geo: GeoClient,
    forecast: ForecastClient,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build against specific clients (integration tests).
    pub fn with_clients(geo: GeoClient, forecast: ForecastClient) -> Self {
        Self { geo, forecast }
    }

    /// Tool entry point.
    ///
    /// Resolves the location and target hour, fetches the forecast and
    /// renders the report. Every failure is returned as a formatted message,
    /// never as an error to the host; the final status event always carries
    /// `done: true`.
    pub async fn current_weather(
        &self,
        query: WeatherQuery<'_>,
        user: Option<&UserRecord>,
        metadata: Option<&RequestMetadata>,
        sink: Option<&dyn StatusSink>,
        now: DateTime<Utc>,
    ) -> String {
        let settings: WeatherSettings =
            user.map(UserRecord::settings_or_default).unwrap_or_default();
        if settings.debug {
            tracing::debug!(
                location = query.location,
                date = query.date,
                hour = query.hour,
                "forecast query"
            );
        }

        match self.run(query, &settings, metadata, sink, now).await {
            Ok(report) => {
                emit(sink, "Weather data retrieval complete.", true);
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
        query: WeatherQuery<'_>,
        settings: &WeatherSettings,
        metadata: Option<&RequestMetadata>,
        sink: Option<&dyn StatusSink>,
        now: DateTime<Utc>,
    ) -> Result<String, WeatherError> {
        let location = resolve_location(
            &self.geo,
            query.location,
            metadata,
            settings.shorten_location,
            sink,
        )
        .await?;
        emit(
            sink,
            format!(
                "Location resolved: {}. Fetching forecast data...",
                location.display_name
            ),
            false,
        );

        let target = resolve_datetime(
            Some(query.date),
            Some(query.hour),
            &settings.language,
            now,
        );
        let target_hour = target_hour_string(target);

        emit(sink, "Fetching forecast data...", false);
        let response = self
            .forecast
            .fetch(location.latitude, location.longitude, settings)
            .await?;
        emit(sink, "Processing weather data...", false);

        if response.current_weather.is_none() {
            return Err(WeatherError::MissingWeatherData);
        }
        let hourly = response.hourly.ok_or(WeatherError::MissingWeatherData)?;
        let index =
            select_hour_index(&hourly.time, &target_hour).ok_or(WeatherError::NoForecastData)?;
        tracing::debug!(
            requested = %target_hour,
            matched = hourly.time.get(index).map(String::as_str).unwrap_or(""),
            "hourly record selected"
        );

        let target_date = target_hour.get(..10).unwrap_or("").to_string();
        let (uv_index, sunrise, sunset) = match &response.daily {
            Some(daily) => {
                let daily_index = select_daily_index(&daily.time, &target_date);
                (
                    sample(&daily.uv_index_max, daily_index),
                    daily.sunrise.get(daily_index).cloned().flatten(),
                    daily.sunset.get(daily_index).cloned().flatten(),
                )
            }
            None => (None, None, None),
        };

        let report = WeatherReport {
            location: location.display_name,
            latitude: location.latitude,
            longitude: location.longitude,
            time: target_hour,
            temperature: sample(&hourly.temperature_2m, index).unwrap_or(0.0),
            apparent_temperature: sample(&hourly.apparent_temperature, index).unwrap_or(0.0),
            humidity: sample(&hourly.relativehumidity_2m, index),
            dew_point: sample(&hourly.dewpoint_2m, index),
            precipitation: sample(&hourly.precipitation, index),
            precipitation_probability: sample(&hourly.precipitation_probability, index),
            wind_speed: sample(&hourly.windspeed_10m, index),
            wind_direction: sample(&hourly.winddirection_10m, index),
            visibility: sample(&hourly.visibility, index),
            pressure: sample(&hourly.surface_pressure, index),
            cloud_cover: sample(&hourly.cloudcover, index),
            uv_index,
            sunrise,
            sunset,
            weather_code: hourly.weathercode.get(index).copied().flatten().unwrap_or(-1),
        };

        Ok(format_report(&report, settings).join("\n"))
    }
}
