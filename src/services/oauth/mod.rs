pub mod client;
pub mod types;

pub use client::{ExchangeError, TokenEndpointClient};
pub use types::TokenResponse;
