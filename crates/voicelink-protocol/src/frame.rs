//! Wire representation of side-channel frames.

use serde::{Deserialize, Serialize};
use voicelink_types::{Citation, Sender};

/// A frame exactly as the agent process publishes it.
///
/// Field names are fixed by the agent and must not be renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireFrame {
    /// A transcript line for the user or the agent.
    #[serde(rename = "transcript")]
    Transcript {
        sender: Sender,
        text: String,
        /// `None` (absent or `null`) is read as final.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_final: Option<bool>,
    },

    /// The retrieval results used to answer `query`.
    #[serde(rename = "rag_sources")]
    RagSources { sources: Vec<Citation>, query: String },

    /// Any other `type` value.
    #[serde(other, skip_serializing)]
    Unknown,
}
