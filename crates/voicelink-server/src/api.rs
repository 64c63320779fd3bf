//! API handlers for the issuer service.

use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use voicelink_types::SessionCredential;

/// Request body for `POST /api/token`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(rename = "roomName")]
    pub room_name: Option<String>,
    #[serde(rename = "participantName")]
    pub participant_name: Option<String>,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("token issuance failed: {0}")]
    TokenIssuance(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::TokenIssuance(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Failed to generate token",
                    "message": msg,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Handler for `GET /health`.
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "livekit": state.issuer.url(),
    }))
}

/// Handler for `POST /api/token`.
///
/// An empty body is accepted; missing or blank fields fall back to the
/// default room and a generated participant identity.
pub async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SessionCredential>, ApiError> {
    let request: TokenRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TokenRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid token request: {}", e)))?
    };

    let credential = state
        .issuer
        .issue(
            request.room_name.as_deref(),
            request.participant_name.as_deref(),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "failed to generate LiveKit token");
            ApiError::TokenIssuance(e.to_string())
        })?;

    Ok(Json(credential))
}
