//! Per-IP rate limiting middleware.
//!
//! A fixed-window counter per client IP: each IP may make at most `max`
//! requests per window. Loopback clients are exempt. This is adapter-layer
//! admission control, entirely outside the pipeline's contract; the map
//! behind the mutex is the only shared mutable state in the service.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use super::handlers::ErrorResponse;

/// Entries above this count trigger a prune of expired windows.
const PRUNE_THRESHOLD: usize = 1024;

/// Fixed-window per-IP request counter.
#[derive(Debug)]
pub struct RateLimiter {
    max: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, (Instant, u32)>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max` requests per `window` per IP.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request from `ip` and return whether it is allowed.
    pub fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter lock poisoned");

        if windows.len() > PRUNE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, (start, _)| now.duration_since(*start) < window);
        }

        let entry = windows.entry(ip).or_insert((now, 0));
        if now.duration_since(entry.0) >= self.window {
            *entry = (now, 0);
        }

        entry.1 += 1;
        entry.1 <= self.max
    }
}

/// Axum middleware enforcing the per-IP limit.
///
/// Reads the peer address from request extensions (populated by
/// `into_make_service_with_connect_info`); requests without one (e.g. in
/// tests driving the router directly) pass through unlimited.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let peer_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    if let Some(ip) = peer_ip {
        if !ip.is_loopback() && !limiter.allow(ip) {
            warn!(client = %ip, "rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse::new("rate_limited", "Limit reached.")),
            )
                .into_response();
        }
    }

    next.run(request).await
}

// =============================================================================
// Tests
// =============================================================================
