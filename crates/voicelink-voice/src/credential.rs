//! Join-credential retrieval.

use crate::config::SessionConfig;
use crate::error::CredentialError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use voicelink_types::SessionCredential;

/// Route appended to the issuer base URL.
const TOKEN_PATH: &str = "/api/token";

/// Something that hands out join credentials. No retries; the caller decides.
#[async_trait]
pub trait CredentialSource: Send + Sync + 'static {
    async fn fetch_credential(
        &self,
        room_name: &str,
        participant_name: Option<&str>,
    ) -> Result<SessionCredential, CredentialError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    room_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    participant_name: Option<&'a str>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Fetches credentials from the issuer over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCredentialFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCredentialFetcher {
    /// Creates a fetcher for the issuer at `issuer_url`.
    pub fn new(issuer_url: &str, timeout: Duration) -> Result<Self, CredentialError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CredentialError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", issuer_url.trim_end_matches('/'), TOKEN_PATH),
        })
    }

    /// Creates a fetcher for the issuer and timeout named in `config`.
    pub fn from_config(config: &SessionConfig) -> Result<Self, CredentialError> {
        Self::new(&config.issuer_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CredentialSource for HttpCredentialFetcher {
    async fn fetch_credential(
        &self,
        room_name: &str,
        participant_name: Option<&str>,
    ) -> Result<SessionCredential, CredentialError> {
        debug!(endpoint = %self.endpoint, room = room_name, "requesting join credential");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&TokenRequest {
                room_name,
                participant_name,
            })
            .send()
            .await
            .map_err(|e| CredentialError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            let message = body
                .and_then(|b| {
                    b.message
                        .filter(|m| !m.is_empty())
                        .or(b.error.filter(|e| !e.is_empty()))
                })
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(status = status.as_u16(), %message, "credential request rejected");
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<SessionCredential>()
            .await
            .map_err(|e| CredentialError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let fetcher =
            HttpCredentialFetcher::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.endpoint(), "http://localhost:3000/api/token");

        let fetcher =
            HttpCredentialFetcher::new("http://localhost:3000", Duration::from_secs(1)).unwrap();
        assert_eq!(fetcher.endpoint(), "http://localhost:3000/api/token");
    }

    #[test]
    fn from_config_uses_issuer_url() {
        let config = SessionConfig {
            issuer_url: "https://voice.example.com/".to_string(),
            ..SessionConfig::default()
        };
        let fetcher = HttpCredentialFetcher::from_config(&config).unwrap();
        assert_eq!(fetcher.endpoint(), "https://voice.example.com/api/token");
    }

    #[test]
    fn request_body_uses_issuer_field_names() {
        let body = serde_json::to_value(TokenRequest {
            room_name: "r1",
            participant_name: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "roomName": "r1" }));

        let body = serde_json::to_value(TokenRequest {
            room_name: "r1",
            participant_name: Some("alice"),
        })
        .unwrap();
        assert_eq!(body["participantName"], "alice");
    }

    #[tokio::test]
    async fn unreachable_issuer_is_reported() {
        // Port 9 (discard) is closed on test machines.
        let fetcher =
            HttpCredentialFetcher::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = fetcher.fetch_credential("r1", None).await;
        assert!(matches!(result, Err(CredentialError::Unreachable(_))));
    }
}
