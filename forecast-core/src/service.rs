//! The weather lookup operation served by the gateway.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use crate::{
    Config,
    error::{GatewayError, ProviderError},
    model::NormalizedWeather,
    provider::{ForecastProvider, provider_from_config},
    transform::{TimeFormat, normalize},
};

/// Looks up and reshapes forecasts. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct ForecastService {
    provider: Arc<dyn ForecastProvider>,
    days: u8,
    time_format: TimeFormat,
}

impl ForecastService {
    pub fn new(provider: Arc<dyn ForecastProvider>, days: u8, time_format: TimeFormat) -> Self {
        Self { provider, days, time_format }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(provider, config.upstream.days, config.display.time_format))
    }

    /// Fetch and normalize the forecast for `query`, using the current time.
    pub async fn weather(&self, query: Option<&str>) -> Result<NormalizedWeather, GatewayError> {
        self.weather_at(query, Utc::now()).await
    }

    /// Same as [`weather`](Self::weather) with an explicit request time.
    #[instrument(skip(self, now), level = "info")]
    pub async fn weather_at(
        &self,
        query: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<NormalizedWeather, GatewayError> {
        let query = match query {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(GatewayError::InvalidRequest),
        };

        let forecast = match self.provider.forecast(query, self.days).await {
            Ok(forecast) => forecast,
            Err(ProviderError::Rejected { status, .. }) => {
                info!(%status, "Upstream rejected location query");
                return Err(GatewayError::LocationNotFound { query: query.to_string() });
            }
            Err(err) => {
                error!(error = %err, "External API error");
                return Err(GatewayError::UpstreamUnavailable(err));
            }
        };

        Ok(normalize(&forecast, now, self.time_format))
    }
}
