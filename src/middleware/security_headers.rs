//! Security-related response headers for browser clients.
//!
//! Responsibility:
//! - Framing restricted to this origin and the file-picker widget
//! - MIME sniffing protection
//! - Referrer leakage control (the finalize redirect carries tokens in its query)
//! - Browser feature restrictions

use axum::Router;
use axum::http::header::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Config;

pub fn frame_ancestors(config: &Config) -> String {
    format!("frame-ancestors 'self' {}", config.oauth.file_picker_host)
}

/// Apply common security headers to all responses.
pub fn apply(router: Router, config: &Config) -> Router {
    // Hosts are validated URLs, so this only fails on exotic characters.
    let csp = HeaderValue::from_str(&frame_ancestors(config))
        .unwrap_or_else(|_| HeaderValue::from_static("frame-ancestors 'self'"));

    router
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("content-security-policy"),
            csp,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ))
}
