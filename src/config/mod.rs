//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared with the HTTP server
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps its runtime state atomically
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so the proxy runs from environment variables alone
//! - Environment variables take precedence over the file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::ProxyConfig;
pub use schema::{
    AccessConfig, CorsConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig,
    StaticFilesConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
