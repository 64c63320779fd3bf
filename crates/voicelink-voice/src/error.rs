use thiserror::Error;

/// The credential issuer could not provide a join credential.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential issuer unreachable: {0}")]
    Unreachable(String),

    #[error("credential request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("credential response is invalid: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Issuer(#[from] IssuerError),
}

/// Failures reported by the real-time transport.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("failed to join room: {0}")]
    Join(String),

    #[error("transport failure: {0}")]
    Runtime(String),

    #[error("failed to attach track {track}: {message}")]
    Attach { track: String, message: String },

    #[error("failed to change microphone state: {0}")]
    Microphone(String),
}

/// A connect attempt failed before the transport acknowledged the join.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Changing the local microphone state failed. Non-fatal.
#[derive(Error, Debug, Clone)]
pub enum MicToggleError {
    #[error("could not enable microphone: {0}")]
    Enable(#[source] TransportError),

    #[error("could not disable microphone: {0}")]
    Disable(#[source] TransportError),
}

impl MicToggleError {
    pub fn new(enabled: bool, source: TransportError) -> Self {
        if enabled {
            Self::Enable(source)
        } else {
            Self::Disable(source)
        }
    }

    /// The microphone state that was requested.
    pub fn requested(&self) -> bool {
        matches!(self, Self::Enable(_))
    }
}

/// Errors returned through a session handle.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Microphone(#[from] MicToggleError),

    #[error("voice session has shut down")]
    Closed,
}

/// Token minting failures.
#[derive(Error, Debug)]
pub enum IssuerError {
    #[error("LiveKit API error: {0}")]
    LiveKit(#[from] livekit_api::access_token::AccessTokenError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
