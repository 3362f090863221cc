/*
 * Responsibility
 * - URL 構造を定義
 * - /callback は authorization server に登録した redirect URI と一致させる (version prefix なし)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::handlers::{callback::callback, health::health, refresh::refresh};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/callback", get(callback))
        .route("/refresh", post(refresh))
}
