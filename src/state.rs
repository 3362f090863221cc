/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - relay: TokenRelay (token endpoint client + token store + OAuthSettings)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::relay::TokenRelay;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<TokenRelay>,
}

impl AppState {
    pub fn new(relay: Arc<TokenRelay>) -> Self {
        Self { relay }
    }
}
