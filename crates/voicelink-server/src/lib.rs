//! Credential issuer service.
//!
//! Hands out short-lived LiveKit join tokens to voice clients over
//! `POST /api/token`.

pub mod api;
pub mod config;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use voicelink_voice::TokenIssuer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Token minting service.
    pub issuer: Arc<TokenIssuer>,
    /// Browser origins allowed to call the API.
    pub cors_origins: Vec<String>,
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Router::new()
        .route("/health", get(api::health))
        .route("/api/token", post(api::token_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        )
        .layer(Extension(Arc::new(state)))
}
