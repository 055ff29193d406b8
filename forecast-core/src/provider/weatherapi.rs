use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ProviderError,
    model::{UpstreamForecast, UpstreamHour},
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: Client::new() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_forecast(&self, query: &str, days: u8) -> Result<UpstreamForecast, ProviderError> {
        let url = format!("{}/forecast.json", self.base_url);
        let days = days.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query), ("days", days.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::BAD_REQUEST {
            return Err(ProviderError::Rejected { status, body: truncate_body(&body) });
        }

        if !status.is_success() {
            return Err(ProviderError::Status { status, body: truncate_body(&body) });
        }

        debug!(%status, bytes = body.len(), "WeatherAPI forecast response received");

        parse_forecast(&body)
    }
}

/// Parse a WeatherAPI.com `forecast.json` body.
pub fn parse_forecast(body: &str) -> Result<UpstreamForecast, ProviderError> {
    let parsed: WaForecastResponse = serde_json::from_str(body)?;
    Ok(parsed.into())
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: Option<String>,
}

/// Hourly conditions only contribute their icon.
#[derive(Debug, Deserialize)]
struct WaHourCondition {
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    pressure_mb: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time_epoch: i64,
    #[serde(default)]
    time: Option<String>,
    temp_c: f64,
    #[serde(default)]
    condition: Option<WaHourCondition>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    #[serde(default)]
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize, Default)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    #[serde(default)]
    forecast: WaForecast,
}

impl From<WaForecastResponse> for UpstreamForecast {
    fn from(raw: WaForecastResponse) -> Self {
        let hours = raw
            .forecast
            .forecastday
            .into_iter()
            .flat_map(|day| day.hour)
            .map(|h| UpstreamHour {
                time_epoch: h.time_epoch,
                local_time: h.time,
                temperature_c: h.temp_c,
                condition_icon: h.condition.and_then(|c| c.icon),
            })
            .collect();

        UpstreamForecast {
            location_name: raw.location.name,
            country: raw.location.country,
            temperature_c: raw.current.temp_c,
            condition: raw.current.condition.text,
            condition_icon: raw.current.condition.icon,
            humidity_pct: raw.current.humidity,
            wind_kph: raw.current.wind_kph,
            pressure_mb: raw.current.pressure_mb,
            hours,
        }
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    async fn forecast(&self, query: &str, days: u8) -> Result<UpstreamForecast, ProviderError> {
        self.fetch_forecast(query, days).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn sample_body() -> serde_json::Value {
        json!({
            "location": { "name": "Indore", "country": "India", "tz_id": "Asia/Kolkata" },
            "current": {
                "temp_c": 21.6,
                "humidity": 48,
                "wind_kph": 9.4,
                "pressure_mb": 1011.0,
                "condition": {
                    "text": "Sunny",
                    "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png",
                    "code": 1000
                }
            },
            "forecast": {
                "forecastday": [{
                    "date": "2025-10-18",
                    "hour": [
                        {
                            "time_epoch": 1_760_725_800,
                            "time": "2025-10-18 00:00",
                            "temp_c": 17.3,
                            "condition": { "text": "Clear", "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png" }
                        },
                        {
                            "time_epoch": 1_760_729_400,
                            "time": "2025-10-18 01:00",
                            "temp_c": 16.8,
                            "condition": { "text": "Clear" }
                        }
                    ]
                }]
            }
        })
    }

    #[test]
    fn parses_forecast_body() {
        let forecast = parse_forecast(&sample_body().to_string()).expect("parse");

        assert_eq!(forecast.location_name, "Indore");
        assert_eq!(forecast.country, "India");
        assert_eq!(forecast.temperature_c, 21.6);
        assert_eq!(forecast.condition, "Sunny");
        assert_eq!(forecast.humidity_pct, 48);
        assert_eq!(forecast.pressure_mb, 1011.0);
        assert_eq!(forecast.hours.len(), 2);
        assert_eq!(forecast.hours[0].local_time.as_deref(), Some("2025-10-18 00:00"));
        assert!(forecast.hours[1].condition_icon.is_none());
    }

    #[test]
    fn hourly_condition_without_text_still_parses() {
        let mut body = sample_body();
        body["forecast"]["forecastday"][0]["hour"][0]["condition"] =
            json!({ "icon": "//cdn.weatherapi.com/weather/64x64/night/116.png" });
        body["forecast"]["forecastday"][0]["hour"][1]
            .as_object_mut()
            .expect("object")
            .remove("condition");

        let forecast = parse_forecast(&body.to_string()).expect("parse");

        assert_eq!(
            forecast.hours[0].condition_icon.as_deref(),
            Some("//cdn.weatherapi.com/weather/64x64/night/116.png")
        );
        assert!(forecast.hours[1].condition_icon.is_none());
    }

    #[test]
    fn missing_forecast_section_yields_no_hours() {
        let mut body = sample_body();
        body.as_object_mut().expect("object").remove("forecast");

        let forecast = parse_forecast(&body.to_string()).expect("parse");
        assert!(forecast.hours.is_empty());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = parse_forecast("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));

        let err = parse_forecast(r#"{"location": {"name": "X"}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn truncate_body_limits_long_bodies() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn sends_key_query_and_days() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "22.7196,75.8577"))
            .and(query_param("days", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into()).with_base_url(server.uri());
        let forecast = provider.forecast("22.7196,75.8577", 1).await.expect("forecast");

        assert_eq!(forecast.location_name, "Indore");
    }

    #[tokio::test]
    async fn bad_request_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into()).with_base_url(format!("{}/", server.uri()));
        let err = provider.forecast("Atlantis", 1).await.unwrap_err();

        match err {
            ProviderError::Rejected { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.contains("No matching location"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into()).with_base_url(server.uri());
        let err = provider.forecast("Delhi", 1).await.unwrap_err();

        assert!(matches!(err, ProviderError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_transport_error() {
        let provider = WeatherApiProvider::new("KEY".into()).with_base_url("http://127.0.0.1:1");
        let err = provider.forecast("Delhi", 1).await.unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
