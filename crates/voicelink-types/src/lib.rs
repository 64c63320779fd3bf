//! Shared types for the Voicelink workspace.
//!
//! This crate holds the data model that every other crate speaks: the
//! connection phase and call state record, transcript messages, retrieval
//! citations, and the short-lived session credential handed to the media
//! session manager.
//!
//! Nothing here performs I/O. The types derive `serde` so the issuer service,
//! the side-channel decoder and presentation layers can share one wire
//! representation.

use serde::{Deserialize, Serialize};

mod credential;
mod transcript;

pub use credential::SessionCredential;
pub use transcript::{Citation, Sender, TranscriptFeed, TranscriptMessage};

/// Room joined when the caller does not name one.
pub const DEFAULT_ROOM_NAME: &str = "voice-ai-room";

/// Lifecycle stage of the media session.
///
/// Exactly one phase holds at a time. `Disconnected` and `Error` are stable
/// until the next connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionPhase {
    /// No session and no attempt in flight.
    #[default]
    Idle,
    /// Credential fetch or transport join in progress.
    Connecting,
    /// Joined; media and data flow.
    Connected,
    /// The transport ended the session.
    Disconnected,
    /// The attempt or the live session failed.
    Error,
}

impl ConnectionPhase {
    /// Returns the wire label for this phase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Error => "error",
        }
    }

    /// Whether a `connect()` issued in this phase is a no-op.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected)
    }
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-visible call status.
///
/// `last_error` is `Some` exactly when `phase` is [`ConnectionPhase::Error`].
/// Fields are read-only outside the projection that owns the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallState {
    pub phase: ConnectionPhase,
    pub mic_enabled: bool,
    pub agent_speaking: bool,
    pub last_error: Option<String>,
}

impl Default for CallState {
    fn default() -> Self {
        Self {
            phase: ConnectionPhase::Idle,
            mic_enabled: true,
            agent_speaking: false,
            last_error: None,
        }
    }
}

impl CallState {
    /// Checks the error/phase invariant.
    pub fn is_consistent(&self) -> bool {
        self.last_error.is_some() == (self.phase == ConnectionPhase::Error)
    }
}
