//! Transcript and citation records.

use serde::{Deserialize, Serialize};

/// Who spoke a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the conversation transcript.
///
/// A message with `is_final == false` may still have its text and finality
/// amended; `id` and `sender` never change once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub timestamp_ms: u64,
    pub is_final: bool,
}

/// A retrieved document fragment shown alongside the transcript.
///
/// `score` is the retriever's relevance in `[0, 1]`. Extra keys the agent
/// sends along with a source (chunk ids, metadata) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub filename: String,
    pub text: String,
    pub score: f64,
}

/// Snapshot of the transcript projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFeed {
    /// Messages in first-seen order.
    pub messages: Vec<TranscriptMessage>,
    /// The most recent citation batch.
    pub citations: Vec<Citation>,
    /// Query text that produced `citations`. Empty when there is no batch.
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_ignores_extra_fields() {
        let json = r#"{"filename":"a.pdf","text":"chunk","score":0.82,"chunk_id":"c-1","metadata":{}}"#;
        let citation: Citation = serde_json::from_str(json).unwrap();
        assert_eq!(citation.filename, "a.pdf");
        assert_eq!(citation.text, "chunk");
        assert!((citation.score - 0.82).abs() < f64::EPSILON);
    }

    #[test]
    fn sender_uses_lowercase_labels() {
        assert_eq!(serde_json::to_value(Sender::User).unwrap(), "user");
        assert_eq!(serde_json::to_value(Sender::Agent).unwrap(), "agent");
        let parsed: Sender = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(parsed, Sender::Agent);
        assert!(serde_json::from_str::<Sender>("\"system\"").is_err());
    }
}
