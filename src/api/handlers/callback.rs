/*
 * Responsibility
 * - GET /callback (authorization server からの redirect 先)
 * - error があれば JSON で返す / code を token に交換して widget の finalize へ 302
 */
use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use crate::{api::dto::callback::CallbackQuery, error::AppError, state::AppState};

pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(error) = query.error.filter(|e| !e.is_empty()) {
        warn!(%error, "authorization server returned an error");
        return Err(AppError::UpstreamAuth {
            error,
            error_description: query.error_description,
        });
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request("MISSING_CODE", "code is required"))?;

    // TODO: validate `state` against an issued value once the authorize step lives here.
    info!(state_present = query.state.is_some(), "exchanging authorization code");

    let location = state.relay.complete_authorization(&code).await?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    ))
}
