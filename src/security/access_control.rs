//! Access Control Middleware.
//! Enforces the shared-secret API key on protected routes.
//!
//! The comparison is a plain byte equality and is not timing-safe.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// True when a non-empty key was provided and equals the expected one.
pub fn key_matches(provided: Option<&[u8]>, expected: &[u8]) -> bool {
    match provided {
        Some(key) => !key.is_empty() && key == expected,
        None => false,
    }
}

pub async fn access_control_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (enabled, allowed) = {
        let config = state.config();
        let access = &config.access;
        let provided = req.headers().get(access.header.as_str()).map(|v| v.as_bytes());
        (access.enabled, key_matches(provided, access.api_key.as_bytes()))
    };

    // Gate disabled: passthrough mode
    if !enabled || allowed {
        return next.run(req).await;
    }

    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::warn!(
        client = %client,
        path = %req.uri().path(),
        "Rejected request with missing or invalid API key"
    );
    metrics::record_unauthorized();

    ApiError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches() {
        assert!(key_matches(Some(b"secret"), b"secret"));
        assert!(!key_matches(Some(b"Secret"), b"secret"));
        assert!(!key_matches(Some(b"secret "), b"secret"));
        assert!(!key_matches(None, b"secret"));
    }

    #[test]
    fn test_empty_key_never_matches() {
        assert!(!key_matches(Some(b""), b""));
        assert!(!key_matches(None, b""));
    }
}
