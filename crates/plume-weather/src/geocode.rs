//! Forward and reverse geocoding.
//!
//! Forward lookups use the Open-Meteo geocoding API; reverse lookups use
//! Nominatim (OpenStreetMap), free and key-less. Reverse geocoding is
//! best-effort only: the caller always gets a display name back.

use serde::Deserialize;

use crate::types::WeatherError;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const USER_AGENT: &str = "plume-weather/0.1";

/// One candidate match from the geocoding search.
#[derive(Debug, Clone, Deserialize)]
pub struct GeoCandidate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// First-level administrative area (state, region).
    #[serde(default)]
    pub admin1: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoCandidate>>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
}

/// Client for the geocoding search and reverse-geocoding endpoints.
#[derive(Debug, Clone)]
pub struct GeoClient {
    client: reqwest::Client,
    search_url: String,
    reverse_url: String,
}

impl Default for GeoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            search_url: GEOCODING_URL.to_string(),
            reverse_url: NOMINATIM_URL.to_string(),
        }
    }

    /// Point the client at different endpoints (integration tests).
    pub fn with_endpoints(search_url: &str, reverse_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            search_url: search_url.to_string(),
            reverse_url: reverse_url.to_string(),
        }
    }

    /// Up to `count` candidate matches for a place name.
    pub async fn search(&self, name: &str, count: u8) -> Result<Vec<GeoCandidate>, WeatherError> {
        let url = format!(
            "{}?name={}&count={}",
            self.search_url,
            urlencoding::encode(name),
            count
        );
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!("Geocoding search returned status {}", response.status());
            return Err(WeatherError::GeocodingUnavailable);
        }
        let body: GeoSearchResponse = response
            .json()
            .await
            .map_err(|_| WeatherError::GeocodingUnavailable)?;
        Ok(body.results.unwrap_or_default())
    }

    /// Best-effort display name for coordinates.
    ///
    /// Falls back to the literal "lat, lon" string on any failure; never
    /// fails the overall call.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        let fallback = format!("{}, {}", latitude, longitude);
        let url = format!(
            "{}?lat={}&lon={}&format=json&zoom=10&addressdetails=1",
            self.reverse_url, latitude, longitude
        );

        let response = match self.client.get(url).header("User-Agent", USER_AGENT).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Reverse geocode request failed: {}", e);
                return fallback;
            }
        };
        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return fallback;
        }
        match response.json::<NominatimResponse>().await {
            Ok(body) => body.display_name.unwrap_or(fallback),
            Err(e) => {
                tracing::debug!("Reverse geocode parse error: {}", e);
                fallback
            }
        }
    }
}
