//! Fixed-window rate limiting per client IP.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Request count for one client in the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Per-client fixed windows. Limits are passed per call so a config reload
/// applies without losing counts.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<IpAddr, Window>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, client: IpAddr, limits: &RateLimitConfig) -> Decision {
        self.check_at(client, limits, Instant::now())
    }

    fn check_at(&self, client: IpAddr, limits: &RateLimitConfig, now: Instant) -> Decision {
        let window_len = Duration::from_secs(limits.window_secs);

        let mut entry = self.windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window_len {
            entry.started = now;
            entry.count = 0;
        }

        if entry.count < limits.max_requests {
            entry.count += 1;
            Decision::Allowed {
                remaining: limits.max_requests - entry.count,
            }
        } else {
            Decision::Limited {
                retry_after: window_len.saturating_sub(now.duration_since(entry.started)),
            }
        }
    }

    /// Drop windows that ended more than `window` ago.
    pub fn purge_expired(&self, window: Duration) {
        self.purge_at(window, Instant::now());
    }

    fn purge_at(&self, window: Duration, now: Instant) {
        self.windows
            .retain(|_, w| now.duration_since(w.started) < window);
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Middleware function for per-IP rate limiting.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limits = state.config().rate_limit.clone();
    if !limits.enabled {
        return next.run(request).await;
    }

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match state.rate_limiter().check(client, &limits) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %client, "Rate limit exceeded");
            metrics::record_rate_limited();
            ApiError::RateLimited {
                // round up so clients never retry early
                retry_after_secs: retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0),
            }
            .into_response()
        }
    }
}
