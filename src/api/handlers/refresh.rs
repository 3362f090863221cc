/*
 * Responsibility
 * - POST /refresh (widget が access token 失効時に呼ぶ)
 * - cache 済み refresh token で access/id token を再取得し JSON で返す
 */
use axum::{
    Json,
    extract::{Query, State},
};
use tracing::debug;

use crate::{
    api::dto::refresh::{RefreshQuery, RefreshResponse},
    error::AppError,
    state::AppState,
};

pub async fn refresh(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<RefreshResponse>, AppError> {
    debug!(
        id_token_present = query.id_token.is_some(),
        username = query.username.as_deref(),
        "refresh requested"
    );

    let tokens = state.relay.refresh().await?;

    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
        id_token: tokens.id_token,
    }))
}
