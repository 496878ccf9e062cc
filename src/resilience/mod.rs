//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce request deadline)
//!     → on expiry: call cancelled, caller maps to 504
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - No retries: a failed lookup is reported to the client as-is

pub mod timeouts;

pub use timeouts::{with_timeout, Elapsed};
