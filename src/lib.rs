//! Backend relay for embedding a document file-picker widget.
//!
//! Completes the OAuth 2.0 authorization-code flow on `GET /callback`,
//! caches the refresh token and renews widget tokens on `POST /refresh`.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
