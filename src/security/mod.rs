//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /player-info request:
//!     → access_control.rs (shared-secret header check)
//!     → rate_limit.rs (per-IP fixed window)
//!     → handler
//!
//! All responses:
//!     → cors.rs (origin policy)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Unauthorized requests never consume rate limit budget

pub mod access_control;
pub mod cors;
pub mod rate_limit;

pub use access_control::access_control_middleware;
pub use cors::cors_layer;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
