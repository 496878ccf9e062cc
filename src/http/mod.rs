//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign request ID)
//!     → /player-info: security gates → player_info.rs → upstream
//!     → /health: health.rs
//!     → anything else: static_files.rs
//!     → response.rs (errors become status + JSON body)
//! ```

pub mod health;
pub mod player_info;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;

pub use request::{RequestIdExt, RequestUuid, X_REQUEST_ID};
pub use response::{ApiError, ErrorBody};
pub use server::{AppState, HttpServer};
