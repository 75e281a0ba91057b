//! Unit-aware report assembly.

use crate::types::{weather_code_description, WeatherSettings};
use crate::units::{celsius_to_kelvin, TemperatureUnit};

/// All values selected for one report, before formatting.
///
/// Optional fields carry a value only when the upstream supplied one; the
/// formatter additionally gates each section on its settings toggle.
#[derive(Debug, Clone, Default)]
pub struct WeatherReport {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub humidity: Option<f64>,
    pub dew_point: Option<f64>,
    pub precipitation: Option<f64>,
    pub precipitation_probability: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub visibility: Option<f64>,
    pub pressure: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub uv_index: Option<f64>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub weather_code: i64,
}

/// Temperatures arrive in the requested unit for celsius and fahrenheit;
/// kelvin is derived from the celsius reading.
fn display_temperature(value: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Kelvin => celsius_to_kelvin(value),
        _ => value,
    }
}

/// Render the report as ordered lines.
///
/// Sections appear in a fixed order (header, time, temperature, humidity,
/// precipitation, wind, visibility, pressure, cloud cover, UV, sun times,
/// condition); each optional line appears only when its toggle is on and the
/// upstream supplied a value.
pub fn format_report(report: &WeatherReport, settings: &WeatherSettings) -> Vec<String> {
    let temp_unit = settings.temperature_unit;
    let temp_symbol = temp_unit.symbol();
    let wind_symbol = settings.wind_unit().symbol();
    let precip_symbol = settings.unit_system.precipitation_symbol();

    let mut lines = vec![
        format!(
            "Weather for {} (Latitude: {}, Longitude: {}):",
            report.location, report.latitude, report.longitude
        ),
        format!("Time: {}", report.time),
        format!(
            "Temperature: {:.1}{}",
            display_temperature(report.temperature, temp_unit),
            temp_symbol
        ),
        format!(
            "Feels Like: {:.1}{}",
            display_temperature(report.apparent_temperature, temp_unit),
            temp_symbol
        ),
    ];

    if settings.show_humidity {
        if let Some(humidity) = report.humidity {
            lines.push(format!("Relative Humidity: {}%", humidity));
        }
        if let Some(dew_point) = report.dew_point {
            lines.push(format!(
                "Dew Point: {:.1}{}",
                display_temperature(dew_point, temp_unit),
                temp_symbol
            ));
        }
    }

    if settings.show_precipitation {
        if let Some(precipitation) = report.precipitation {
            lines.push(format!("Precipitation: {}{}", precipitation, precip_symbol));
        }
        if let Some(probability) = report.precipitation_probability {
            lines.push(format!("Precipitation Probability: {}%", probability));
        }
    }

    if settings.show_wind {
        if let Some(speed) = report.wind_speed {
            lines.push(format!("Wind Speed: {} {}", speed, wind_symbol));
        }
        if let Some(direction) = report.wind_direction {
            lines.push(format!("Wind Direction: {}°", direction));
        }
    }

    if settings.show_visibility {
        if let Some(visibility) = report.visibility {
            lines.push(format!("Visibility: {}m", visibility));
        }
    }

    if settings.show_pressure {
        if let Some(pressure) = report.pressure {
            lines.push(format!("Pressure: {} hPa", pressure));
        }
    }

    if settings.show_cloud_cover {
        if let Some(cloud_cover) = report.cloud_cover {
            lines.push(format!("Cloud Cover: {}%", cloud_cover));
        }
    }

    if settings.show_uv_index {
        if let Some(uv_index) = report.uv_index {
            lines.push(format!("UV Index (max): {}", uv_index));
        }
    }

    if settings.show_sun_times {
        if let (Some(sunrise), Some(sunset)) = (&report.sunrise, &report.sunset) {
            lines.push(format!("Sunrise: {}", sunrise));
            lines.push(format!("Sunset: {}", sunset));
        }
    }

    lines.push(format!(
        "Weather: {} (Code: {})",
        weather_code_description(report.weather_code),
        report.weather_code
    ));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_report() -> WeatherReport {
        WeatherReport {
            location: "Lyon, Auvergne-Rhône-Alpes, France".to_string(),
            latitude: 45.76,
            longitude: 4.84,
            time: "2025-06-01T12:00".to_string(),
            temperature: 21.4,
            apparent_temperature: 20.1,
            humidity: Some(55.0),
            dew_point: Some(11.8),
            precipitation: Some(0.0),
            precipitation_probability: Some(10.0),
            wind_speed: Some(12.0),
            wind_direction: Some(220.0),
            visibility: Some(24140.0),
            pressure: Some(1013.2),
            cloud_cover: Some(40.0),
            uv_index: Some(6.2),
            sunrise: Some("2025-06-01T05:52".to_string()),
            sunset: Some("2025-06-01T21:24".to_string()),
            weather_code: 2,
        }
    }

    #[test]
    fn test_default_settings_hide_optional_sections() {
        let lines = format_report(&full_report(), &WeatherSettings::default());
        let joined = lines.join("\n");
        assert!(joined.contains("Weather for Lyon"));
        assert!(joined.contains("Temperature: 21.4°C"));
        assert!(joined.contains("Relative Humidity: 55%"));
        assert!(joined.contains("Wind Speed: 12 km/h"));
        assert!(!joined.contains("Visibility"));
        assert!(!joined.contains("UV Index"));
        assert!(!joined.contains("Sunrise"));
        assert!(joined.contains("Weather: Partly cloudy (Code: 2)"));
    }

    #[test]
    fn test_all_toggles_on_keeps_fixed_order() {
        let settings = WeatherSettings {
            show_visibility: true,
            show_pressure: true,
            show_cloud_cover: true,
            show_uv_index: true,
            show_sun_times: true,
            ..Default::default()
        };
        let lines = format_report(&full_report(), &settings);
        let position = |needle: &str| {
            lines
                .iter()
                .position(|l| l.starts_with(needle))
                .unwrap_or_else(|| panic!("missing line: {needle}"))
        };
        assert!(position("Weather for") < position("Time:"));
        assert!(position("Time:") < position("Temperature:"));
        assert!(position("Feels Like:") < position("Relative Humidity:"));
        assert!(position("Precipitation:") < position("Wind Speed:"));
        assert!(position("Wind Direction:") < position("Visibility:"));
        assert!(position("Visibility:") < position("Pressure:"));
        assert!(position("Pressure:") < position("Cloud Cover:"));
        assert!(position("Cloud Cover:") < position("UV Index"));
        assert!(position("UV Index") < position("Sunrise:"));
        assert!(position("Sunset:") < position("Weather:"));
    }

    #[test]
    fn test_kelvin_is_derived_from_celsius() {
        let report = WeatherReport {
            temperature: 26.85,
            apparent_temperature: 26.85,
            ..full_report()
        };
        let settings = WeatherSettings {
            temperature_unit: TemperatureUnit::Kelvin,
            ..Default::default()
        };
        let lines = format_report(&report, &settings);
        assert!(lines.iter().any(|l| l == "Temperature: 300.0K"), "{lines:?}");
    }

    #[test]
    fn test_missing_values_hide_lines_even_when_toggled_on() {
        let report = WeatherReport {
            humidity: None,
            dew_point: None,
            sunrise: None,
            ..full_report()
        };
        let settings = WeatherSettings {
            show_sun_times: true,
            ..Default::default()
        };
        let lines = format_report(&report, &settings);
        let joined = lines.join("\n");
        assert!(!joined.contains("Relative Humidity"));
        assert!(!joined.contains("Dew Point"));
        // Sun times need both ends
        assert!(!joined.contains("Sunset"));
    }

    #[test]
    fn test_imperial_symbols() {
        use crate::units::UnitSystem;
        let settings = WeatherSettings {
            temperature_unit: TemperatureUnit::Fahrenheit,
            unit_system: UnitSystem::Imperial,
            wind_speed_unit: "mph".to_string(),
            ..Default::default()
        };
        let lines = format_report(&full_report(), &settings);
        let joined = lines.join("\n");
        assert!(joined.contains("Temperature: 21.4°F"));
        assert!(joined.contains("Precipitation: 0inch"));
        assert!(joined.contains("Wind Speed: 12 mph"));
    }
}
