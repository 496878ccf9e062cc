//! Error responses.
//!
//! Every failure the proxy reports is an `ApiError`; its `IntoResponse`
//! impl is the single place where the error taxonomy becomes a status code
//! and a JSON body of the form `{"error": ..., "details"?: ...}`.
//!
//! | Error             | Status |
//! |-------------------|--------|
//! | `MissingUid`      | 400    |
//! | `Unauthorized`    | 401    |
//! | `RateLimited`     | 429    |
//! | `UpstreamTimeout` | 504    |
//! | `Upstream`        | 502    |
//! | `Internal`        | 500    |

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("uid is required")]
    MissingUid,

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream request timed out")]
    UpstreamTimeout,

    #[error("Failed to reach upstream API")]
    Upstream(#[source] UpstreamError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingUid => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        if err.is_timeout() {
            ApiError::UpstreamTimeout
        } else {
            ApiError::Upstream(err)
        }
    }
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
            details: match &self {
                ApiError::Upstream(e) => Some(e.to_string()),
                _ => None,
            },
        };

        let mut response = (self.status_code(), Json(body)).into_response();
        if let ApiError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
