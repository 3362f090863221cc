/*
 * Responsibility
 * - Config読み込み → 依存生成 (token endpoint client / token store / relay) → Router 組み立て
 * - Middleware の適用 (HTTP / CORS / security headers)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::oauth::TokenEndpointClient;
use crate::services::relay::TokenRelay;
use crate::services::token_store::{MemoryTokenStore, TokenStore};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,filepicker_relay=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing; stderr may be hidden.
        tracing::error!(?info, "panic");

        // Development: fail fast. Production: default hook, keep serving.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting relay in {:?} mode on {}",
        config.app_env,
        config.addr
    );
    tracing::info!(
        request_timeout = ?config.request_timeout,
        upstream_timeout = ?config.oauth.upstream_timeout,
        token_endpoint = %config.oauth.token_endpoint(),
        finalize_endpoint = %config.oauth.finalize_endpoint(),
        redirect_uri = %config.oauth.redirect_uri,
        "oauth settings loaded"
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("relay stopped");
    Ok(())
}

/// Build process-level services with the default in-memory token store.
pub fn build_state(config: &Config) -> Result<AppState> {
    build_state_with_store(config, Arc::new(MemoryTokenStore::new()))
}

pub fn build_state_with_store(config: &Config, store: Arc<dyn TokenStore>) -> Result<AppState> {
    let client = TokenEndpointClient::new(config.oauth.clone())
        .context("initialising HTTP client for the token endpoint")?;
    let relay = TokenRelay::new(client, store, config.oauth.clone());

    Ok(AppState::new(Arc::new(relay)))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes().with_state(state);

    let router = middleware::security_headers::apply(router, config);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
