//! Per-client fixed-window rate limiting.

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use forecast_core::config::RateLimitConfig;
use parking_lot::Mutex;
use tracing::warn;

use crate::server::ErrorBody;

pub const LIMITED_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { reset: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

#[derive(Debug)]
struct Clients {
    windows: HashMap<String, Window>,
    last_prune: Instant,
}

#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    clients: Mutex<Clients>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        let clients = Clients { windows: HashMap::new(), last_prune: Instant::now() };
        Self { window, max_requests, clients: Mutex::new(clients) }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(Duration::from_secs(config.window_secs), config.max_requests)
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Count one request from `client`.
    pub fn check(&self, client: &str) -> Decision {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> Decision {
        let mut clients = self.clients.lock();

        // Sweep expired windows at most once per window length.
        if now.saturating_duration_since(clients.last_prune) >= self.window {
            let window = self.window;
            clients.windows.retain(|_, w| now.saturating_duration_since(w.started) < window);
            clients.last_prune = now;
        }

        let entry = clients.windows.entry(client.to_string()).or_insert(Window { started: now, hits: 0 });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window { started: now, hits: 0 };
        }

        let reset = self.window.saturating_sub(now.saturating_duration_since(entry.started));

        if entry.hits >= self.max_requests {
            return Decision::Limited { reset };
        }

        entry.hits += 1;
        Decision::Allowed { remaining: self.max_requests - entry.hits, reset }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.clients.lock().windows.len()
    }
}

/// Middleware gate in front of every route.
pub async fn enforce(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client) {
        Decision::Allowed { remaining, reset } => {
            let mut response = next.run(request).await;
            set_headers(response.headers_mut(), limiter.max_requests(), remaining, reset);
            response
        }
        Decision::Limited { reset } => {
            warn!(%client, "Rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorBody { error: LIMITED_MESSAGE.to_string() }),
            )
                .into_response();
            let headers = response.headers_mut();
            set_headers(headers, limiter.max_requests(), 0, reset);
            headers.insert(axum::http::header::RETRY_AFTER, HeaderValue::from(seconds_ceil(reset)));
            response
        }
    }
}

fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn set_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset: Duration) {
    headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(limit));
    headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(remaining));
    headers.insert(HeaderName::from_static("ratelimit-reset"), HeaderValue::from(seconds_ceil(reset)));
}

fn seconds_ceil(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
