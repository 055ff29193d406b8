use crate::{Config, UpstreamForecast, error::ProviderError, provider::weatherapi::WeatherApiProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

/// Source of upstream forecasts.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetch current conditions and `days` of hourly forecast for `query`.
    ///
    /// `query` is a place name or a `"<lat>,<lon>"` pair, forwarded as-is.
    async fn forecast(&self, query: &str, days: u8) -> Result<UpstreamForecast, ProviderError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn ForecastProvider>> {
    let api_key = config.upstream_api_key()?;

    let provider = WeatherApiProvider::new(api_key.to_owned())
        .with_base_url(config.upstream.base_url.clone());

    Ok(Arc::new(provider))
}
