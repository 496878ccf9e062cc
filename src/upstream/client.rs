//! Upstream HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - Build the lookup URL for a player id
//! - Issue a single GET bounded by the configured deadline
//! - Cap the body size before decoding
//! - Classify failures (timeout, status, transport, decode)

use reqwest::Client;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::resilience::with_timeout;
use crate::upstream::types::{UpstreamError, UpstreamResult, REGION};

/// Stateless client for the player-info service.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
    max_body_bytes: usize,
}

impl UpstreamClient {
    /// Create a new upstream client.
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            UpstreamError::InvalidUrl(format!("'{}': {}", config.base_url, e))
        })?;

        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Transport(error_chain(&e)))?;

        Ok(Self {
            http,
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lookup URL for `uid`. The id is percent-encoded as a query value.
    pub fn player_url(&self, uid: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("region", REGION)
            .append_pair("uid", uid);
        url
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// The deadline covers the whole exchange, body included. On expiry the
    /// request future is dropped, which closes the upstream connection.
    pub async fn fetch_json(&self, url: Url) -> UpstreamResult<Value> {
        let start = Instant::now();

        let exchange = async {
            let mut response = self
                .http
                .get(url.clone())
                .send()
                .await
                .map_err(|e| UpstreamError::Transport(error_chain(&e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status(status.as_u16()));
            }

            let limit = self.max_body_bytes;
            if response.content_length().is_some_and(|len| len > limit as u64) {
                return Err(UpstreamError::BodyTooLarge(limit));
            }

            // Content-Length may be absent or wrong; count while reading.
            let mut body = Vec::new();
            while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| UpstreamError::Transport(error_chain(&e)))?
            {
                if body.len() + chunk.len() > limit {
                    return Err(UpstreamError::BodyTooLarge(limit));
                }
                body.extend_from_slice(&chunk);
            }

            serde_json::from_slice::<Value>(&body)
                .map_err(|e| UpstreamError::Decode(e.to_string()))
        };

        let result = match with_timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(self.timeout)),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::record_upstream(outcome, start);

        tracing::debug!(
            url = %url,
            outcome,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream call finished"
        );

        result
    }
}

/// Render an error with its source chain; reqwest hides the cause in `source()`.
fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
