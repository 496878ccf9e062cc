//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that enabled features carry the settings they need
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("upstream.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,

    #[error("upstream.base_url '{0}' is not a valid http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("access.api_key must be set when the access gate is enabled")]
    MissingApiKey,

    #[error("access.header '{0}' is not a valid header name")]
    InvalidAccessHeader(String),

    #[error("rate_limit.{0} must be greater than zero when rate limiting is enabled")]
    ZeroRateLimit(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.upstream.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.access.enabled {
        if config.access.api_key.is_empty() {
            errors.push(ValidationError::MissingApiKey);
        }
        if axum::http::HeaderName::from_bytes(config.access.header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidAccessHeader(
                config.access.header.clone(),
            ));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::ZeroRateLimit("window_secs"));
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimit("max_requests"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
