//! `GET /health`.
//!
//! Liveness only: the upstream is never contacted, so the answer does not
//! depend on upstream state.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::server::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub ok: bool,
    pub pid: u32,
    /// `PORT` as set in the environment (a string), or null.
    pub env_port: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        ok: true,
        pid: std::process::id(),
        env_port: state.config().listener.env_port.clone(),
    })
}
