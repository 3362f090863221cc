/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RelayError / ExchangeError / StoreError を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::oauth::ExchangeError;
use crate::services::relay::RelayError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// The authorization server redirected back with `error=...`.
    #[error("authorization failed: {error}")]
    UpstreamAuth {
        error: String,
        error_description: Option<String>,
    },
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("no refresh token available")]
    NoCachedRefreshToken,
    #[error("{0}")]
    TokenExchangeFailed(String),
    #[error("{0}")]
    UpstreamUnavailable(String),
    #[error("token endpoint timed out")]
    UpstreamTimeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // Delivered as a regular JSON payload, not as a relay failure.
            AppError::UpstreamAuth { .. } => StatusCode::OK,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NoCachedRefreshToken => StatusCode::UNAUTHORIZED,
            AppError::TokenExchangeFailed(_) | AppError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message) = match self {
            // Surfaced verbatim, in the authorization server's own shape.
            AppError::UpstreamAuth {
                error,
                error_description,
            } => {
                let body = json!({
                    "error": error,
                    "error_description": error_description,
                });
                return (status, Json(body)).into_response();
            }
            AppError::BadRequest { code, message } => (code, message),
            AppError::NoCachedRefreshToken => {
                ("NO_REFRESH_TOKEN", "no refresh token available".into())
            }
            AppError::TokenExchangeFailed(message) => ("TOKEN_EXCHANGE_FAILED", message),
            AppError::UpstreamUnavailable(message) => ("UPSTREAM_UNAVAILABLE", message),
            AppError::UpstreamTimeout => (
                "UPSTREAM_TIMEOUT",
                "token endpoint timed out".into(),
            ),
            AppError::Internal => ("INTERNAL", "internal server error".into()),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::Rejected { .. } | ExchangeError::InvalidResponse(_) => {
                AppError::TokenExchangeFailed(format!("Failed to get tokens ({e})"))
            }
            ExchangeError::Timeout => AppError::UpstreamTimeout,
            ExchangeError::Transport(_) => AppError::UpstreamUnavailable(e.to_string()),
        }
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::NoCachedRefreshToken => AppError::NoCachedRefreshToken,
            RelayError::Exchange(e) => e.into(),
            RelayError::Store(e) => {
                error!(error = %e, "token store failure");
                AppError::Internal
            }
        }
    }
}
