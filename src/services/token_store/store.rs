//! Token store interface used by the relay to keep refresh tokens between requests.
use async_trait::async_trait;
use thiserror::Error;

/// Result type for token store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors.
///
/// Kept independent from `AppError`; the relay decides how a store failure
/// surfaces over HTTP.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("token store backend error: {0}")]
    Backend(String),
}

/// A minimal key-value store for opaque token strings.
///
/// Keys identify a session or user; values are raw token strings.
/// `set` overwrites unconditionally (last writer wins).
#[async_trait]
pub trait TokenStore: Send + Sync + 'static {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, token: &str) -> StoreResult<()>;
}
