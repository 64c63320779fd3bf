//! Error types for side-channel decoding.

/// Reasons a side-channel payload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolDecodeError {
    /// The payload is not valid UTF-8.
    #[error("side-channel payload is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload is not JSON, or a recognized frame is missing fields.
    #[error("side-channel payload is malformed: {0}")]
    Json(#[from] serde_json::Error),

    /// The `type` tag names a frame this client does not handle.
    #[error("side-channel frame type is not recognized")]
    UnknownType,
}
