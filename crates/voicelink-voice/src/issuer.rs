use crate::config::LiveKitConfig;
use crate::credential::CredentialSource;
use crate::error::{CredentialError, IssuerError};
use async_trait::async_trait;
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;
use voicelink_types::{SessionCredential, DEFAULT_ROOM_NAME};

/// Mints LiveKit join tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    config: LiveKitConfig,
}

impl TokenIssuer {
    pub fn new(config: LiveKitConfig) -> Self {
        Self { config }
    }

    /// Whether API credentials are present.
    pub fn is_enabled(&self) -> bool {
        !self.config.api_key.is_empty() && !self.config.api_secret.is_empty()
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Issues a credential for `room_name` as `participant`.
    ///
    /// Blank or missing values fall back to the default room and to a
    /// `user-<unix ms>` identity.
    pub fn issue(
        &self,
        room_name: Option<&str>,
        participant: Option<&str>,
    ) -> Result<SessionCredential, IssuerError> {
        if !self.is_enabled() {
            return Err(IssuerError::Config(
                "LiveKit API key and secret are required".to_string(),
            ));
        }

        let room_name = room_name
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROOM_NAME)
            .to_string();
        let identity = participant
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("user-{}", chrono::Utc::now().timestamp_millis()));

        let token = AccessToken::with_api_key(&self.config.api_key, &self.config.api_secret)
            .with_identity(&identity)
            .with_name(&identity)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.clone(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.config.token_ttl_seconds))
            .to_jwt()?;

        tracing::info!(room = %room_name, %identity, "issued join token");

        Ok(SessionCredential {
            identity,
            room_name,
            transport_url: self.config.url.clone(),
            token,
        })
    }
}

/// In-process issuance, for deployments that hold the API secret locally.
#[async_trait]
impl CredentialSource for TokenIssuer {
    async fn fetch_credential(
        &self,
        room_name: &str,
        participant_name: Option<&str>,
    ) -> Result<SessionCredential, CredentialError> {
        Ok(self.issue(Some(room_name), participant_name)?)
    }
}
