//! Typed decoding of side-channel payloads.

use crate::error::ProtocolDecodeError;
use crate::frame::WireFrame;
use serde::{Deserialize, Serialize};
use voicelink_types::{Citation, Sender, TranscriptMessage};

/// How transcript delivery ids are derived.
///
/// The agent does not send ids, so the client makes one per arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryIdScheme {
    /// `<arrival_ms>-<sender>`.
    ///
    /// Two frames from the same sender that arrive in the same millisecond
    /// get the same id, and the second is treated as an update of the first.
    #[default]
    TimestampSender,
    /// `<arrival_ms>-<sender>-<n>` where `n` counts decoded transcript frames.
    /// Ids never collide within one decoder.
    Sequenced,
}

/// A decoded side-channel event.
#[derive(Debug, Clone, PartialEq)]
pub enum SideChannelEvent {
    /// Append or amend a transcript line.
    Transcript(TranscriptMessage),
    /// Replace the citation batch.
    Citations { sources: Vec<Citation>, query: String },
}

/// Stateful decoder for one session's data channel.
#[derive(Debug, Default)]
pub struct SideChannelDecoder {
    scheme: DeliveryIdScheme,
    sequence: u64,
}

impl SideChannelDecoder {
    pub fn new(scheme: DeliveryIdScheme) -> Self {
        Self {
            scheme,
            sequence: 0,
        }
    }

    pub fn scheme(&self) -> DeliveryIdScheme {
        self.scheme
    }

    /// Decodes one payload that arrived at `arrival_ms` (Unix milliseconds).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolDecodeError`] for non-UTF-8 input, malformed JSON,
    /// missing fields, or an unrecognized `type`.
    pub fn decode(
        &mut self,
        payload: &[u8],
        arrival_ms: u64,
    ) -> Result<SideChannelEvent, ProtocolDecodeError> {
        let text = std::str::from_utf8(payload)?;
        let frame: WireFrame = serde_json::from_str(text)?;

        match frame {
            WireFrame::Transcript {
                sender,
                text,
                is_final,
            } => {
                let id = self.delivery_id(arrival_ms, sender);
                Ok(SideChannelEvent::Transcript(TranscriptMessage {
                    id,
                    sender,
                    text,
                    timestamp_ms: arrival_ms,
                    is_final: is_final.unwrap_or(true),
                }))
            }
            WireFrame::RagSources { sources, query } => {
                Ok(SideChannelEvent::Citations { sources, query })
            }
            WireFrame::Unknown => Err(ProtocolDecodeError::UnknownType),
        }
    }

    fn delivery_id(&mut self, arrival_ms: u64, sender: Sender) -> String {
        match self.scheme {
            DeliveryIdScheme::TimestampSender => format!("{}-{}", arrival_ms, sender),
            DeliveryIdScheme::Sequenced => {
                self.sequence += 1;
                format!("{}-{}-{}", arrival_ms, sender, self.sequence)
            }
        }
    }
}
