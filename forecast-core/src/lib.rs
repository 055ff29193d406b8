//! Core library for the forecast gateway.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream forecast provider abstraction and its WeatherAPI.com client
//! - Domain models (upstream forecast, normalized payload)
//! - Icon code extraction and the forecast transformation
//! - The weather lookup service and its error taxonomy
//!
//! It is used by `forecast-gateway`, but carries no HTTP server code of its own.

pub mod config;
pub mod error;
pub mod icon;
pub mod model;
pub mod provider;
pub mod service;
pub mod transform;

pub use config::Config;
pub use error::{GatewayError, ProviderError};
pub use model::{HourlyEntry, NormalizedWeather, UpstreamForecast, UpstreamHour};
pub use provider::{ForecastProvider, weatherapi::WeatherApiProvider};
pub use service::ForecastService;
pub use transform::TimeFormat;
