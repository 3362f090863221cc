//! HTTP client for the authorization server's token endpoint.
use std::sync::Arc;
use std::time::Instant;

use hyper::ext::ReasonPhrase;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OAuthSettings;
use crate::services::oauth::types::{OAuthErrorBody, TokenGrant, TokenResponse};

// Cap on how much of an upstream error body is kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Token endpoint failures.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// Token endpoint answered with a non-2xx status.
    #[error("token endpoint returned {} {reason}{}", .status.as_u16(), oauth_suffix(.oauth_error))]
    Rejected {
        status: StatusCode,
        reason: String,
        oauth_error: Option<String>,
    },

    #[error("token endpoint timed out")]
    Timeout,

    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    /// 2xx with a body that is not a token response.
    #[error("invalid token endpoint response: {0}")]
    InvalidResponse(String),
}

fn oauth_suffix(oauth_error: &Option<String>) -> String {
    match oauth_error {
        Some(code) => format!(" ({code})"),
        None => String::new(),
    }
}

impl ExchangeError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExchangeError::Timeout
        } else {
            ExchangeError::Transport(e.to_string())
        }
    }
}

/// Performs the two grants this relay needs against `{auth_server_host}/oauth/token`.
///
/// Cheap to clone; the underlying `reqwest::Client` pools connections.
#[derive(Clone, Debug)]
pub struct TokenEndpointClient {
    http: reqwest::Client,
    settings: Arc<OAuthSettings>,
}

impl TokenEndpointClient {
    /// Fails only when the TLS backend cannot be initialised.
    pub fn new(settings: Arc<OAuthSettings>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(settings.upstream_timeout)
            .build()?;

        Ok(Self { http, settings })
    }

    /// `grant_type=authorization_code`
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ExchangeError> {
        self.request_token(TokenGrant::AuthorizationCode {
            client_id: &self.settings.client_id,
            client_secret: &self.settings.client_secret,
            code,
            redirect_uri: &self.settings.redirect_uri,
        })
        .await
    }

    /// `grant_type=refresh_token`
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ExchangeError> {
        self.request_token(TokenGrant::RefreshToken {
            client_id: &self.settings.client_id,
            client_secret: &self.settings.client_secret,
            refresh_token,
        })
        .await
    }

    async fn request_token(&self, grant: TokenGrant<'_>) -> Result<TokenResponse, ExchangeError> {
        let grant_type = grant.grant_type();
        let started = Instant::now();

        let response = self
            .http
            .post(self.settings.token_endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&grant)
            .send()
            .await
            .map_err(|e| {
                let err = ExchangeError::from_reqwest(e);
                warn!(grant_type, error = %err, "token request failed");
                err
            })?;

        let status = response.status();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.is_success() {
            let reason = reason_phrase(status, response.extensions().get::<ReasonPhrase>());
            let body = response.text().await.unwrap_or_default();
            let oauth = serde_json::from_str::<OAuthErrorBody>(&body).ok();
            warn!(
                grant_type,
                status = status.as_u16(),
                elapsed_ms,
                oauth_error = oauth.as_ref().map(|b| b.error.as_str()),
                oauth_error_description = oauth.as_ref().and_then(|b| b.error_description.as_deref()),
                body = %truncate(&body, MAX_ERROR_BODY_CHARS),
                "token endpoint rejected request"
            );
            return Err(ExchangeError::Rejected {
                status,
                reason,
                oauth_error: oauth.map(|b| b.error),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(ExchangeError::from_reqwest)?;
        let token: TokenResponse = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(grant_type, error = %e, "token endpoint returned an unexpected body");
            ExchangeError::InvalidResponse(e.to_string())
        })?;

        debug!(
            grant_type,
            status = status.as_u16(),
            elapsed_ms,
            token_type = %token.token_type,
            "token endpoint ok"
        );
        Ok(token)
    }
}

/// Reason phrase of the upstream status line.
///
/// hyper only keeps the phrase when it differs from the canonical one, so the
/// canonical phrase stands in otherwise.
fn reason_phrase(status: StatusCode, sent: Option<&ReasonPhrase>) -> String {
    match sent {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_message_names_status_and_oauth_code() {
        let err = ExchangeError::Rejected {
            status: StatusCode::BAD_REQUEST,
            reason: "Bad Request".into(),
            oauth_error: Some("invalid_grant".into()),
        };
        assert_eq!(
            err.to_string(),
            "token endpoint returned 400 Bad Request (invalid_grant)"
        );

        let err = ExchangeError::Rejected {
            status: StatusCode::UNAUTHORIZED,
            reason: "Unauthorized".into(),
            oauth_error: None,
        };
        assert_eq!(err.to_string(), "token endpoint returned 401 Unauthorized");
    }

    #[test]
    fn client_builds_from_settings() {
        let settings = Arc::new(OAuthSettings {
            client_id: "cid".into(),
            client_secret: "sec".into(),
            auth_server_host: "https://auth.example.test".into(),
            file_picker_host: "https://picker.example.test".into(),
            redirect_uri: "http://localhost:8008/callback".into(),
            upstream_timeout: std::time::Duration::from_secs(10),
            rotate_refresh_token: false,
        });

        let client = TokenEndpointClient::new(settings).unwrap();
        assert_eq!(
            client.settings.token_endpoint(),
            "https://auth.example.test/oauth/token"
        );
    }

    #[test]
    fn reason_phrase_prefers_what_upstream_sent() {
        let sent = ReasonPhrase::from_static(b"Refresh Token Revoked");
        assert_eq!(
            reason_phrase(StatusCode::BAD_REQUEST, Some(&sent)),
            "Refresh Token Revoked"
        );
        assert_eq!(reason_phrase(StatusCode::BAD_REQUEST, None), "Bad Request");
        assert_eq!(
            reason_phrase(StatusCode::from_u16(499).unwrap(), None),
            "Unknown"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
