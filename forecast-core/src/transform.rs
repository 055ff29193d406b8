//! Reshaping of an upstream forecast into the client payload.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    icon::extract_icon_code,
    model::{HourlyEntry, NormalizedWeather, UpstreamForecast, UpstreamHour},
};

/// Maximum number of upcoming hours served to clients.
pub const HOURLY_LIMIT: usize = 4;

/// Clock style used for hourly labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `2:00 PM`
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    /// `14:00`
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "%-I:%M %p",
            TimeFormat::TwentyFourHour => "%H:%M",
        }
    }
}

/// Build the client payload from an upstream forecast fetched at `now`.
pub fn normalize(
    forecast: &UpstreamForecast,
    now: DateTime<Utc>,
    format: TimeFormat,
) -> NormalizedWeather {
    NormalizedWeather {
        city: forecast.location_name.clone(),
        country: forecast.country.clone(),
        temp: round_temperature(forecast.temperature_c),
        description: forecast.condition.clone(),
        icon: extract_icon_code(forecast.condition_icon.as_deref()),
        humidity: forecast.humidity_pct,
        wind_speed: forecast.wind_kph,
        pressure: forecast.pressure_mb,
        hourly: upcoming_hours(&forecast.hours, now, format),
    }
}

/// Round half away from zero; `-0.4` becomes `0`, never `-0`.
pub fn round_temperature(celsius: f64) -> i64 {
    celsius.round() as i64
}

fn upcoming_hours(hours: &[UpstreamHour], now: DateTime<Utc>, format: TimeFormat) -> Vec<HourlyEntry> {
    let cutoff = now.timestamp();
    let mut last_epoch = cutoff;
    let mut entries = Vec::with_capacity(HOURLY_LIMIT);

    for hour in hours {
        if entries.len() == HOURLY_LIMIT {
            break;
        }
        // Out-of-order upstream entries are dropped to keep the series increasing.
        if hour.time_epoch <= last_epoch {
            continue;
        }
        last_epoch = hour.time_epoch;

        entries.push(HourlyEntry {
            time: hour_label(hour, format),
            temp: round_temperature(hour.temperature_c),
            icon: extract_icon_code(hour.condition_icon.as_deref()),
        });
    }

    entries
}

/// Prefer the wall-clock time at the location; fall back to UTC from the epoch.
fn hour_label(hour: &UpstreamHour, format: TimeFormat) -> String {
    let local = hour
        .local_time
        .as_deref()
        .and_then(|s| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M").ok());

    let naive = local.or_else(|| DateTime::from_timestamp(hour.time_epoch, 0).map(|dt| dt.naive_utc()));

    match naive {
        Some(dt) => dt.format(format.pattern()).to_string(),
        None => hour.time_epoch.to_string(),
    }
}
