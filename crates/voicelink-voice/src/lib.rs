//! Client-side voice session orchestration.
//!
//! Obtains a join credential, joins a real-time media room through a
//! pluggable [`Transport`], publishes the local microphone, plays back the
//! agent's audio and turns side-channel frames into an ordered transcript
//! with retrieval citations.
//!
//! Presentation layers never touch the transport. They drive a
//! [`VoiceSessionHandle`] and read two projections:
//!
//! - [`CallStateStore`]: connection phase, microphone, agent speaking, last error.
//! - [`TranscriptStore`]: transcript entries and the latest citation batch.
//!
//! Token minting for the issuer service lives in [`TokenIssuer`].

pub mod attachments;
pub mod config;
pub mod credential;
pub mod error;
pub mod issuer;
pub mod projection;
pub mod session;
pub mod transport;

pub use attachments::AudioAttachments;
pub use config::{LiveKitConfig, SessionConfig, SessionOptions};
pub use credential::{CredentialSource, HttpCredentialFetcher};
pub use error::{
    ConnectError, CredentialError, IssuerError, MicToggleError, SessionError, TransportError,
};
pub use issuer::TokenIssuer;
pub use projection::{CallStateStore, TranscriptStore, TranscriptUpdate};
pub use session::{Clock, SessionManager, SessionNotice, VoiceSessionHandle};
pub use transport::{
    PlaybackHandle, RemoteTrack, TrackKind, Transport, TransportEvent, TransportEvents,
    TransportSession,
};
