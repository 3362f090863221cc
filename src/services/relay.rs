//! Orchestrates the authorization-code exchange and the refresh grant around the token store.
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::OAuthSettings;
use crate::services::oauth::{ExchangeError, TokenEndpointClient};
use crate::services::token_store::{StoreError, TokenStore};

/// Store key of the shared refresh-token slot.
///
/// Every user writes to the same key; a second code exchange overwrites the first
/// user's token.
pub const SHARED_REFRESH_SLOT: &str = "refresh_token";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("no refresh token available")]
    NoCachedRefreshToken,

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Access + ID token handed to the widget.
#[derive(Clone)]
pub struct WidgetTokens {
    pub access_token: String,
    pub id_token: String,
}

pub struct TokenRelay {
    client: TokenEndpointClient,
    store: Arc<dyn TokenStore>,
    settings: Arc<OAuthSettings>,
}

impl TokenRelay {
    pub fn new(
        client: TokenEndpointClient,
        store: Arc<dyn TokenStore>,
        settings: Arc<OAuthSettings>,
    ) -> Self {
        Self {
            client,
            store,
            settings,
        }
    }

    /// Exchange an authorization code and remember the refresh token.
    ///
    /// Returns the finalize URL the browser must be redirected to.
    pub async fn complete_authorization(&self, code: &str) -> Result<String, RelayError> {
        let token = self.client.exchange_code(code).await?;

        match token.refresh_token.as_deref() {
            Some(refresh_token) => {
                self.store.set(SHARED_REFRESH_SLOT, refresh_token).await?;
                info!(
                    backend = self.store.backend_name(),
                    "authorization code exchanged, refresh token cached"
                );
            }
            None => {
                warn!("authorization code exchanged without a refresh token; cache left unchanged");
            }
        }

        Ok(finalize_url(
            &self.settings,
            &token.access_token,
            &token.id_token,
        ))
    }

    /// Mint a fresh access/ID token pair from the cached refresh token.
    pub async fn refresh(&self) -> Result<WidgetTokens, RelayError> {
        let cached = self
            .store
            .get(SHARED_REFRESH_SLOT)
            .await?
            .ok_or(RelayError::NoCachedRefreshToken)?;

        let token = self.client.refresh(&cached).await?;

        // A rotated refresh token is dropped unless ROTATE_REFRESH_TOKEN is set.
        if let Some(rotated) = token.refresh_token.as_deref() {
            if rotated != cached {
                if self.settings.rotate_refresh_token {
                    self.store.set(SHARED_REFRESH_SLOT, rotated).await?;
                    info!("rotated refresh token cached");
                } else {
                    warn!("authorization server rotated the refresh token; keeping the cached one");
                }
            }
        }

        Ok(WidgetTokens {
            access_token: token.access_token,
            id_token: token.id_token,
        })
    }
}

/// `{file_picker_host}/auth-finalize?access_token=..&client_id=..&id_token=..&redirect_url=..`
pub fn finalize_url(settings: &OAuthSettings, access_token: &str, id_token: &str) -> String {
    format!(
        "{}?access_token={}&client_id={}&id_token={}&redirect_url={}",
        settings.finalize_endpoint(),
        urlencoding::encode(access_token),
        urlencoding::encode(&settings.client_id),
        urlencoding::encode(id_token),
        urlencoding::encode(&settings.redirect_uri),
    )
}
