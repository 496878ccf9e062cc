//! Upstream payload types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Region sent with every lookup, regardless of client input.
pub const REGION: &str = "me";

/// JSON pointers tried, in order, when extracting the account name.
const ACCOUNT_NAME_PATHS: [&str; 2] = ["/AccountInfo/AccountName", "/captainBasicInfo/nickname"];

/// Errors that can occur while talking to the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// No complete response within the deadline; the call was cancelled.
    #[error("Upstream request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Upstream answered with a non-success status.
    #[error("Upstream HTTP {0}")]
    Status(u16),

    /// Connection, DNS or protocol failure.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// Body longer than the configured cap; reading stopped there.
    #[error("Upstream body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// Body was not valid JSON.
    #[error("Upstream returned an undecodable body: {0}")]
    Decode(String),

    /// Base URL could not be parsed.
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(String),
}

impl UpstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout(_))
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout(_) => "timeout",
            UpstreamError::Status(_) => "status",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::BodyTooLarge(_) => "body_too_large",
            UpstreamError::Decode(_) => "decode",
            UpstreamError::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Result type for upstream operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Normalized lookup result returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub uid: String,
    pub region: String,
    #[serde(rename = "AccountName")]
    pub account_name: Option<String>,
    pub raw: Value,
}

impl PlayerInfo {
    pub fn from_upstream(uid: String, raw: Value) -> Self {
        Self {
            uid,
            region: REGION.to_string(),
            account_name: extract_account_name(&raw),
            raw,
        }
    }
}

/// Pull the account name out of an upstream body.
///
/// Tries `AccountInfo.AccountName`, then `captainBasicInfo.nickname`.
/// Missing, empty and non-string values fall through; `None` if nothing matches.
pub fn extract_account_name(body: &Value) -> Option<String> {
    ACCOUNT_NAME_PATHS
        .iter()
        .filter_map(|path| body.pointer(path))
        .filter_map(Value::as_str)
        .find(|name| !name.is_empty())
        .map(str::to_owned)
}
