use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use voicelink_protocol::DeliveryIdScheme;
use voicelink_types::DEFAULT_ROOM_NAME;

fn default_token_ttl_seconds() -> u64 {
    3600
}

fn default_livekit_url() -> String {
    "ws://localhost:7880".to_string()
}

fn default_issuer_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_room_name() -> String {
    DEFAULT_ROOM_NAME.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

/// Credentials and endpoint used to mint join tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct LiveKitConfig {
    /// Transport endpoint handed to clients in every credential.
    #[serde(default = "default_livekit_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// JWT token TTL in seconds for join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: default_livekit_url(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

/// Capture and subscription hints passed through to the transport.
///
/// The orchestrator does not implement any of these; it only forwards them
/// when a session is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default = "default_true")]
    pub echo_cancellation: bool,
    #[serde(default = "default_true")]
    pub noise_suppression: bool,
    #[serde(default = "default_true")]
    pub auto_gain_control: bool,
    /// Let the transport pause or downscale media nobody is consuming.
    #[serde(default = "default_true")]
    pub adaptive_stream: bool,
    /// Let the transport stop publishing layers nobody subscribes to.
    #[serde(default = "default_true")]
    pub dynacast: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            adaptive_stream: true,
            dynacast: true,
        }
    }
}

/// Client-side settings for the media session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the credential issuer (the `/api/token` route is appended).
    #[serde(default = "default_issuer_url")]
    pub issuer_url: String,
    /// Room requested for every attempt.
    #[serde(default = "default_room_name")]
    pub room_name: String,
    /// Participant name sent to the issuer. The issuer picks one when unset.
    #[serde(default)]
    pub participant_name: Option<String>,
    /// Timeout for the credential request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// How transcript delivery ids are derived.
    #[serde(default)]
    pub delivery_ids: DeliveryIdScheme,
    #[serde(default)]
    pub capture: SessionOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            issuer_url: default_issuer_url(),
            room_name: default_room_name(),
            participant_name: None,
            request_timeout_ms: default_request_timeout_ms(),
            delivery_ids: DeliveryIdScheme::default(),
            capture: SessionOptions::default(),
        }
    }
}

impl SessionConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
