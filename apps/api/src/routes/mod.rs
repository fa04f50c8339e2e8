pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::analysis::handlers;
use crate::config::Config;
use crate::errors::panic_response;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(handlers::handle_analyze))
        .route("/upload", post(handlers::handle_upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// CORS for the single configured frontend origin, credentials allowed.
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .with_context(|| format!("ALLOWED_ORIGIN is not a valid origin: {}", config.allowed_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
