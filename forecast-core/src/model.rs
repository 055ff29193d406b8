use serde::{Deserialize, Serialize};

/// Forecast as returned by the upstream provider, after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamForecast {
    pub location_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub condition: String,
    /// Icon URL, e.g. `//cdn.weatherapi.com/weather/64x64/day/113.png`.
    pub condition_icon: Option<String>,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    /// Hourly series in upstream order.
    pub hours: Vec<UpstreamHour>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamHour {
    pub time_epoch: i64,
    /// Wall-clock time at the location, `YYYY-MM-DD HH:MM`.
    pub local_time: Option<String>,
    pub temperature_c: f64,
    pub condition_icon: Option<String>,
}

/// Payload served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeather {
    pub city: String,
    pub country: String,
    pub temp: i64,
    pub description: String,
    pub icon: Option<String>,
    pub humidity: u8,
    pub wind_speed: f64,
    pub pressure: f64,
    pub hourly: Vec<HourlyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyEntry {
    pub time: String,
    pub temp: i64,
    pub icon: Option<String>,
}
