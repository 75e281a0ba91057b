//! Weather tools for the plume extensions.
//!
//! Two callable tools share one resolution pipeline: free-form location text
//! (or device coordinates) becomes latitude/longitude plus a display name,
//! free-form date/hour text becomes an hour-aligned instant, and the fetched
//! forecast is rendered as a unit-aware report. The forecast tool talks to
//! Open-Meteo; the marine tool talks to a keyed premium provider.

pub mod forecast;
pub mod geocode;
pub mod locate;
pub mod marine;
pub mod report;
pub mod tool;
pub mod types;
pub mod units;
pub mod when;

pub use forecast::ForecastClient;
pub use geocode::GeoClient;
pub use locate::resolve_location;
pub use marine::{MarineSettings, MarineTool, MarineToolSettings};
pub use report::{format_report, WeatherReport};
pub use tool::{WeatherQuery, WeatherTool};
pub use types::{weather_code_description, ResolvedLocation, WeatherError, WeatherSettings};
pub use units::{TemperatureUnit, UnitSystem, WindSpeedUnit};
pub use when::resolve_datetime;
