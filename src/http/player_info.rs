//! `GET /player-info` handler.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::upstream::PlayerInfo;

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub uid: Option<String>,
}

/// Look up a player upstream and normalize the answer.
///
/// Runs behind the access gate and the rate limiter. An absent or empty
/// `uid` is rejected before any upstream call.
pub async fn player_info(
    State(state): State<AppState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Result<Json<PlayerInfo>, ApiError> {
    let uid = match query {
        Ok(Query(PlayerQuery { uid: Some(uid) })) if !uid.is_empty() => uid,
        Ok(_) => {
            tracing::debug!("Rejected lookup without uid");
            return Err(ApiError::MissingUid);
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected lookup with malformed query");
            return Err(ApiError::MissingUid);
        }
    };

    let upstream = state.upstream();
    let url = upstream.player_url(&uid);

    match upstream.fetch_json(url).await {
        Ok(raw) => {
            let info = PlayerInfo::from_upstream(uid, raw);
            tracing::info!(
                uid = %info.uid,
                account_name = ?info.account_name,
                "Player lookup succeeded"
            );
            Ok(Json(info))
        }
        Err(e) => {
            tracing::error!(uid = %uid, error = %e, "Player lookup failed");
            Err(e.into())
        }
    }
}
