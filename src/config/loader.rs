//! Configuration loading from disk and the environment.

use std::path::Path;
use std::fs;
use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Build the effective configuration and validate it.
///
/// Precedence, lowest first: defaults, the TOML file (if any), environment
/// variables, then `port_override` from the command line.
pub fn load_config(path: Option<&Path>, port_override: Option<u16>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    if let Some(port) = port_override {
        config.listener.port = port;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut ProxyConfig) -> Result<(), ConfigError> {
    apply_overrides_from(config, |var| std::env::var(var).ok())
}

/// Apply overrides read through `lookup`.
///
/// Recognized variables: `PORT`, `MY_API_KEY`, `UPSTREAM_URL`,
/// `UPSTREAM_TIMEOUT_MS`, `UPSTREAM_MAX_BODY_BYTES`, `CORS_ORIGIN`, `RATE_LIMIT_WINDOW_SECS`,
/// `RATE_LIMIT_MAX`, `STATIC_DIR`.
pub fn apply_overrides_from<F>(config: &mut ProxyConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("PORT") {
        config.listener.port = parse_var("PORT", raw.clone())?;
        config.listener.env_port = Some(raw);
    }

    if let Some(key) = lookup("MY_API_KEY") {
        config.access.api_key = key;
    }

    if let Some(url) = lookup("UPSTREAM_URL") {
        config.upstream.base_url = url;
    }

    if let Some(ms) = lookup("UPSTREAM_TIMEOUT_MS") {
        config.upstream.timeout_ms = parse_var("UPSTREAM_TIMEOUT_MS", ms)?;
    }

    if let Some(bytes) = lookup("UPSTREAM_MAX_BODY_BYTES") {
        config.upstream.max_body_bytes = parse_var("UPSTREAM_MAX_BODY_BYTES", bytes)?;
    }

    if let Some(origin) = lookup("CORS_ORIGIN") {
        // "*" and empty both mean any origin
        config.cors.allowed_origin = match origin.trim() {
            "" | "*" => None,
            o => Some(o.to_string()),
        };
    }

    if let Some(secs) = lookup("RATE_LIMIT_WINDOW_SECS") {
        config.rate_limit.window_secs = parse_var("RATE_LIMIT_WINDOW_SECS", secs)?;
    }

    if let Some(max) = lookup("RATE_LIMIT_MAX") {
        config.rate_limit.max_requests = parse_var("RATE_LIMIT_MAX", max)?;
    }

    if let Some(dir) = lookup("STATIC_DIR") {
        config.static_files.root_dir = dir;
    }

    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
