//! Upstream player-info service integration.
//!
//! # Data Flow
//! ```text
//! uid from query string
//!     → client.rs (build URL with region "me", GET with deadline)
//!     → types.rs (classify failure, extract account name)
//!     → PlayerInfo returned to the handler
//! ```
//!
//! # Constraints
//! - One outbound call per lookup: no retries, no caching
//! - Non-success upstream statuses are errors, never decoded

pub mod client;
pub mod types;

pub use client::UpstreamClient;
pub use types::{extract_account_name, PlayerInfo, UpstreamError, UpstreamResult, REGION};
