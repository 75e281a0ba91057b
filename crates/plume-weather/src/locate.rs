//! Location resolution.
//!
//! Exactly one resolution path is taken per call, in priority order:
//! an explicit coordinate pair in the query string, device coordinates from
//! the request metadata, then geocoding by place name.

use once_cell::sync::Lazy;
use plume_host::{emit, RequestMetadata, StatusSink};
use regex::Regex;

use crate::geocode::{GeoCandidate, GeoClient};
use crate::types::{ResolvedLocation, WeatherError};

/// Device metadata carries "latitude, longitude" with decimal numbers.
static DEVICE_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<lat>-?\d+(?:\.\d+)?)\s*,\s*(?P<lon>-?\d+(?:\.\d+)?)").expect("valid regex")
});

/// Parse an explicit "lat,lon"-like pair.
///
/// Accepts `,`, `/` or `x` as the separator and an optional trailing degree
/// symbol on each part. Values outside coordinate ranges are rejected.
pub fn parse_coordinate_pair(text: &str) -> Option<(f64, f64)> {
    let trimmed = text.trim();
    let separator = [',', '/', 'x'].into_iter().find(|sep| trimmed.contains(*sep))?;
    let (first, second) = trimmed.split_once(separator)?;
    let latitude = parse_coordinate(first)?;
    let longitude = parse_coordinate(second)?;
    (latitude.abs() <= 90.0 && longitude.abs() <= 180.0).then_some((latitude, longitude))
}

fn parse_coordinate(part: &str) -> Option<f64> {
    part.trim().trim_end_matches('°').trim().parse().ok()
}

/// Coordinates from the host's device-resolved metadata string.
pub fn parse_device_location(metadata: &RequestMetadata) -> Option<(f64, f64)> {
    let raw = metadata.device_location()?;
    let caps = DEVICE_LOCATION.captures(raw)?;
    let latitude: f64 = caps["lat"].parse().ok()?;
    let longitude: f64 = caps["lon"].parse().ok()?;
    Some((latitude, longitude))
}

/// Split "city, region" on the first comma.
fn split_city_region(location: &str) -> (String, Option<String>) {
    match location.split_once(',') {
        Some((city, region)) => (city.trim().to_string(), Some(region.trim().to_string())),
        None => (location.trim().to_string(), None),
    }
}

/// Pick the first candidate whose region matches the qualifier
/// (case-insensitive); without a qualifier or a match, the first candidate.
fn choose_candidate<'a>(
    candidates: &'a [GeoCandidate],
    region: Option<&str>,
) -> Option<&'a GeoCandidate> {
    region
        .and_then(|region| {
            let wanted = region.to_lowercase();
            candidates
                .iter()
                .find(|c| c.admin1.as_deref().is_some_and(|a| a.to_lowercase() == wanted))
        })
        .or_else(|| candidates.first())
}

/// "name, region, country" display string, region omitted when shortened.
fn display_name(candidate: &GeoCandidate, shorten: bool) -> String {
    let mut name = candidate.name.clone();
    if !shorten {
        if let Some(admin1) = &candidate.admin1 {
            name.push_str(", ");
            name.push_str(admin1);
        }
    }
    if let Some(country) = &candidate.country {
        name.push_str(", ");
        name.push_str(country);
    }
    name
}

async fn resolve_by_name(
    geo: &GeoClient,
    location: &str,
    shorten: bool,
) -> Result<ResolvedLocation, WeatherError> {
    let (city, region) = split_city_region(location);
    let candidates = geo.search(&city, 10).await?;
    let chosen = choose_candidate(&candidates, region.as_deref())
        .ok_or(WeatherError::LocationNotFound(city))?;
    Ok(ResolvedLocation {
        latitude: chosen.latitude,
        longitude: chosen.longitude,
        display_name: display_name(chosen, shorten),
    })
}

/// Resolve the query location to coordinates plus a display name.
pub async fn resolve_location(
    geo: &GeoClient,
    location: &str,
    metadata: Option<&RequestMetadata>,
    shorten: bool,
    sink: Option<&dyn StatusSink>,
) -> Result<ResolvedLocation, WeatherError> {
    let location = location.trim();

    if location.is_empty() {
        if let Some((latitude, longitude)) = metadata.and_then(parse_device_location) {
            emit(sink, "Resolving a place name for the device coordinates...", false);
            let display_name = geo.reverse(latitude, longitude).await;
            emit(sink, format!("Location resolved from metadata: {display_name}."), false);
            return Ok(ResolvedLocation { latitude, longitude, display_name });
        }
    } else if let Some((latitude, longitude)) = parse_coordinate_pair(location) {
        emit(sink, "Resolving a place name for the coordinates...", false);
        let display_name = geo.reverse(latitude, longitude).await;
        emit(sink, format!("Location resolved from coordinates: {display_name}."), false);
        return Ok(ResolvedLocation { latitude, longitude, display_name });
    } else {
        emit(sink, format!("Fetching location data for '{location}'..."), false);
        return resolve_by_name(geo, location, shorten).await;
    }

    Err(WeatherError::LocationNotFound(location.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_host::USER_LOCATION_VAR;

    fn candidate(name: &str, admin1: Option<&str>, country: Option<&str>) -> GeoCandidate {
        GeoCandidate {
            name: name.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            admin1: admin1.map(str::to_string),
            country: country.map(str::to_string),
        }
    }

    #[test]
    fn test_coordinate_pair_separators() {
        assert_eq!(parse_coordinate_pair("45.775, 4.881"), Some((45.775, 4.881)));
        assert_eq!(parse_coordinate_pair("45.775/4.881"), Some((45.775, 4.881)));
        assert_eq!(parse_coordinate_pair("45.775x4.881"), Some((45.775, 4.881)));
    }

    #[test]
    fn test_coordinate_pair_degree_suffix_and_negatives() {
        assert_eq!(parse_coordinate_pair("45.775°, 4.881°"), Some((45.775, 4.881)));
        assert_eq!(parse_coordinate_pair("-33.9, 151.2"), Some((-33.9, 151.2)));
    }

    #[test]
    fn test_coordinate_pair_rejects_place_names() {
        assert!(parse_coordinate_pair("Paris, Ile-de-France").is_none());
        assert!(parse_coordinate_pair("Berlin").is_none());
        assert!(parse_coordinate_pair("Aix-en-Provence").is_none());
    }

    #[test]
    fn test_coordinate_pair_rejects_out_of_range() {
        assert!(parse_coordinate_pair("100.0, 4.881").is_none());
        assert!(parse_coordinate_pair("45.775, 200.0").is_none());
    }

    #[test]
    fn test_device_location_parsing() {
        let mut metadata = RequestMetadata::default();
        metadata
            .variables
            .insert(USER_LOCATION_VAR.to_string(), "45.775, 4.881".to_string());
        assert_eq!(parse_device_location(&metadata), Some((45.775, 4.881)));
    }

    #[test]
    fn test_device_location_rejects_junk() {
        let mut metadata = RequestMetadata::default();
        metadata
            .variables
            .insert(USER_LOCATION_VAR.to_string(), "somewhere nice".to_string());
        assert!(parse_device_location(&metadata).is_none());
    }

    #[test]
    fn test_split_city_region() {
        assert_eq!(
            split_city_region("Columbus, Ohio"),
            ("Columbus".to_string(), Some("Ohio".to_string()))
        );
        assert_eq!(split_city_region("Berlin"), ("Berlin".to_string(), None));
    }

    #[test]
    fn test_choose_candidate_region_filter_is_case_insensitive() {
        let candidates = vec![
            candidate("Paris", Some("Texas"), Some("United States")),
            candidate("Paris", Some("Ile-de-France"), Some("France")),
        ];
        let chosen = choose_candidate(&candidates, Some("ile-de-france")).unwrap();
        assert_eq!(chosen.admin1.as_deref(), Some("Ile-de-France"));
    }

    #[test]
    fn test_choose_candidate_falls_back_to_first() {
        let candidates = vec![
            candidate("Paris", Some("Texas"), Some("United States")),
            candidate("Paris", Some("Ile-de-France"), Some("France")),
        ];
        assert_eq!(
            choose_candidate(&candidates, Some("Bretagne")).unwrap().admin1.as_deref(),
            Some("Texas")
        );
        assert_eq!(choose_candidate(&candidates, None).unwrap().admin1.as_deref(), Some("Texas"));
        assert!(choose_candidate(&[], Some("Bretagne")).is_none());
    }

    #[test]
    fn test_display_name_shortening() {
        let full = candidate("Lyon", Some("Auvergne-Rhône-Alpes"), Some("France"));
        assert_eq!(display_name(&full, false), "Lyon, Auvergne-Rhône-Alpes, France");
        assert_eq!(display_name(&full, true), "Lyon, France");
    }

    #[tokio::test]
    async fn test_explicit_coordinates_skip_forward_geocoding() {
        // No servers are listening: a forward geocode would error, but the
        // coordinate path only performs the best-effort reverse lookup.
        let geo = GeoClient::with_endpoints("http://127.0.0.1:1", "http://127.0.0.1:1");
        let resolved = resolve_location(&geo, "45.775, 4.881", None, false, None)
            .await
            .unwrap();
        assert_eq!(resolved.latitude, 45.775);
        assert_eq!(resolved.longitude, 4.881);
        assert_eq!(resolved.display_name, "45.775, 4.881");
    }

    #[tokio::test]
    async fn test_empty_location_without_metadata_is_not_found() {
        let geo = GeoClient::with_endpoints("http://127.0.0.1:1", "http://127.0.0.1:1");
        let result = resolve_location(&geo, "", None, false, None).await;
        assert!(matches!(result, Err(WeatherError::LocationNotFound(_))));
    }
}
