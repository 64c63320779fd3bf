//! Seam between the session manager and a real-time media library.
//!
//! The media transport itself (signalling, ICE, codecs) lives outside this
//! workspace. An adapter implements [`Transport`] and [`TransportSession`]
//! on top of the library and normalizes its callbacks into
//! [`TransportEvent`]s. The manager never sees library types.

use crate::config::SessionOptions;
use crate::error::TransportError;
use async_trait::async_trait;
use tokio::sync::mpsc;
use voicelink_types::SessionCredential;

/// Media kind of a remote track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A track published by a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    /// Transport-assigned track id. Keys the attachment set.
    pub sid: String,
    pub kind: TrackKind,
    /// Identity of the publishing participant.
    pub participant: String,
}

impl RemoteTrack {
    pub fn audio(sid: impl Into<String>, participant: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            kind: TrackKind::Audio,
            participant: participant.into(),
        }
    }
}

/// Normalized session events, delivered in order on one stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The join was acknowledged. Adapters must emit this once per session.
    Connected,
    /// The transport ended the session (server kick, network loss, remote leave).
    Disconnected { reason: Option<String> },
    /// Media paths are being renegotiated; the session is still alive.
    Reconnecting,
    Reconnected,
    TrackSubscribed(RemoteTrack),
    TrackUnsubscribed(RemoteTrack),
    /// One data-channel payload, forwarded verbatim.
    DataReceived {
        payload: Vec<u8>,
        participant: Option<String>,
    },
    /// Unrecoverable failure of the live session.
    Failed { message: String },
}

/// Receiving half of a session's event stream.
pub type TransportEvents = mpsc::UnboundedReceiver<TransportEvent>;

/// Local playback of one subscribed remote track.
///
/// Dropping the handle releases the playback resources. Since the session
/// manager owns every handle, each one is released exactly once.
pub trait PlaybackHandle: Send + Sync {
    /// Id of the track being played.
    fn track_sid(&self) -> &str;
}

/// Factory for sessions. One call per connect attempt.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Builds a new session with `options` and joins the credential's room.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Join`] when the handshake fails. No session
    /// object outlives a failed join.
    async fn join(
        &self,
        credential: &SessionCredential,
        options: &SessionOptions,
    ) -> Result<(Box<dyn TransportSession>, TransportEvents), TransportError>;
}

/// A joined session.
#[async_trait]
pub trait TransportSession: Send + Sync {
    /// Starts or stops publishing the local microphone.
    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), TransportError>;

    /// Starts local playback of a subscribed audio track.
    fn attach_audio(&self, track: &RemoteTrack) -> Result<Box<dyn PlaybackHandle>, TransportError>;

    /// Leaves the room. Must tolerate repeated calls.
    async fn leave(&self);
}
