//! HTTP surface: routing, middleware and error responses.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use forecast_core::{Config, ForecastService, GatewayError, NormalizedWeather};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::rate_limit::{self, FixedWindowLimiter};

#[derive(Debug, Clone)]
struct AppState {
    service: ForecastService,
}

/// JSON error shape shared by every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct WeatherParams {
    city: Option<String>,
}

struct ApiError(GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0.status_code(), Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

pub fn router(service: ForecastService, limiter: Arc<FixedWindowLimiter>) -> Router {
    Router::new()
        .route("/api/weather", get(weather))
        .route("/health", get(health))
        .with_state(AppState { service })
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: &Config, service: ForecastService) -> anyhow::Result<()> {
    let limiter = Arc::new(FixedWindowLimiter::from_config(&config.rate_limit));
    let app = router(service, limiter);

    let addr = config.listen_addr();
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {addr}"))?;

    info!("Server running on {}", listener.local_addr().context("Listener has no address")?);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server terminated with an error")?;

    info!("Server stopped");
    Ok(())
}

async fn weather(
    State(state): State<AppState>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<NormalizedWeather>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        debug!(%rejection, "Rejected weather query string");
        GatewayError::InvalidRequest
    })?;
    let weather = state.service.weather(params.city.as_deref()).await?;
    Ok(Json(weather))
}

async fn health() -> &'static str {
    "OK"
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
