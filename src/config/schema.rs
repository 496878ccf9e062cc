//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the player-info proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Upstream player-info service.
    pub upstream: UpstreamConfig,

    /// Shared-secret access gate.
    pub access: AccessConfig,

    /// Cross-origin settings.
    pub cors: CorsConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Static site served alongside the API.
    pub static_files: StaticFilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind host (e.g., "0.0.0.0").
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Raw `PORT` environment value, if set. Reported verbatim by `/health`.
    #[serde(skip)]
    pub env_port: Option<String>,
}

impl ListenerConfig {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            env_port: None,
        }
    }
}

/// Upstream service configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Player-info endpoint; `region` and `uid` are appended as query parameters.
    pub base_url: String,

    /// Deadline for the whole upstream exchange in milliseconds.
    pub timeout_ms: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` for upstream calls.
    pub system_proxy: bool,

    /// Largest upstream body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://shop2like-major-login.vercel.app/player-info".to_string(),
            timeout_ms: 15_000,
            user_agent: concat!("player-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            system_proxy: true,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Access gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    /// Enable the shared-secret check on `/player-info`.
    pub enabled: bool,

    /// Header carrying the candidate key.
    pub header: String,

    /// Expected key. Usually supplied through `MY_API_KEY`.
    pub api_key: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header: "x-api-key".to_string(),
            api_key: String::new(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CorsConfig {
    /// Single allowed origin. `None` allows any origin.
    pub allowed_origin: Option<String>,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Length of the fixed window in seconds.
    pub window_secs: u64,

    /// Maximum requests per client within one window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 60,
        }
    }
}

/// Static site configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Serve the asset directory.
    pub enabled: bool,

    /// Asset directory.
    pub root_dir: String,

    /// Document served for `/`, relative to `root_dir`.
    pub index_file: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_dir: "static".to_string(),
            index_file: "index.html".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
