/*
 * Responsibility
 * - Config読み込み → KeyStore 構築 → Router 組み立て
 * - Middleware の適用 (HTTP 共通 / Bearer 検証)
 * - axum::serve() で起動
 */
use std::str::FromStr;

use anyhow::{Context, Result};
use axum::{Router, http::HeaderName, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::middleware::http::HttpLimits;
use crate::services::auth::{build_verification_config, load_key_store};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG=info,cognito_guard=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let state = build_state(&config)?;
    let app = build_router(state, config.http_limits);

    tracing::info!(
        addr = %config.addr,
        region = %config.aws_region,
        user_pool_id = %config.user_pool_id,
        "starting"
    );

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("cannot bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let keys = load_key_store(config)?;
    if keys.is_empty() {
        tracing::warn!("key set has no usable keys; every token will be rejected");
    }
    let token_header = HeaderName::from_str(&config.token_header)
        .with_context(|| format!("invalid token header {}", config.token_header))?;

    Ok(AppState::new(
        keys,
        build_verification_config(config),
        token_header,
        &config.realm,
    ))
}

pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let router = Router::new()
        .route("/health", get(api::v1::handlers::health::health))
        .nest("/api/v1", api::v1::routes(state.clone()))
        .fallback(|| async { AppError::not_found("route") })
        .with_state(state);

    middleware::http::apply(router, limits)
}
