//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The raced future is dropped on expiry, which aborts the in-flight call;
//!   the timer is dropped with it whichever side finishes first

use std::future::Future;
use std::time::Duration;

pub use tokio::time::error::Elapsed;

/// Run `future` with a deadline of `duration`.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T, Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future).await
}
