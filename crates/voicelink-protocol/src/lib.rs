//! Side-channel protocol for Voicelink voice sessions.
//!
//! The voice agent publishes structured events on the session's data
//! channel alongside the media stream. Each payload is one self-contained
//! UTF-8 JSON object discriminated by its `type` field:
//!
//! | `type` | Fields | Effect |
//! |--------|--------|--------|
//! | `transcript` | `sender` (`user`/`agent`), `text`, `is_final` (optional, default `true`) | append or amend a transcript line |
//! | `rag_sources` | `sources` (list of `{filename, text, score}`), `query` | replace the citation batch |
//!
//! Anything else is rejected with a [`ProtocolDecodeError`]. Callers are
//! expected to drop such frames; a bad frame never invalidates the session.
//!
//! # Usage
//!
//! ```rust
//! use voicelink_protocol::{SideChannelDecoder, SideChannelEvent};
//!
//! let mut decoder = SideChannelDecoder::default();
//! let payload = br#"{"type":"transcript","sender":"agent","text":"Hello"}"#;
//! match decoder.decode(payload, 1_700_000_000_000) {
//!     Ok(SideChannelEvent::Transcript(message)) => assert_eq!(message.text, "Hello"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

mod decode;
mod error;
mod frame;

pub use decode::{DeliveryIdScheme, SideChannelDecoder, SideChannelEvent};
pub use error::ProtocolDecodeError;
pub use frame::WireFrame;

#[cfg(test)]
mod tests;
