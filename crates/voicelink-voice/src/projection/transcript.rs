use std::sync::Arc;
use tokio::sync::watch;
use voicelink_types::{Citation, TranscriptFeed, TranscriptMessage};

/// What `append_or_update` did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptUpdate {
    /// New id; appended at the end.
    Appended,
    /// Existing non-final entry amended in place.
    Amended,
    /// Existing entry is already final; nothing changed.
    Ignored,
}

/// Ordered transcript log plus the latest citation batch.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    tx: Arc<watch::Sender<TranscriptFeed>>,
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TranscriptFeed::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<TranscriptFeed> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TranscriptFeed {
        self.tx.borrow().clone()
    }

    /// Appends a message with an unseen id, or amends the existing entry.
    ///
    /// Amending keeps the entry's position, id and sender and takes the new
    /// text and finality. Final entries are never amended.
    pub fn append_or_update(&self, message: TranscriptMessage) -> TranscriptUpdate {
        let mut outcome = TranscriptUpdate::Ignored;
        self.tx.send_if_modified(|feed| {
            match feed.messages.iter_mut().find(|m| m.id == message.id) {
                None => {
                    feed.messages.push(message);
                    outcome = TranscriptUpdate::Appended;
                    true
                }
                Some(existing) if existing.is_final => false,
                Some(existing) => {
                    existing.text = message.text;
                    existing.is_final = message.is_final;
                    outcome = TranscriptUpdate::Amended;
                    true
                }
            }
        });
        outcome
    }

    /// Replaces the citation batch and its query in one update.
    pub fn replace_citations(&self, sources: Vec<Citation>, query: impl Into<String>) {
        let query = query.into();
        self.tx.send_modify(|feed| {
            feed.citations = sources;
            feed.query = query;
        });
    }

    /// Empties the transcript and the citation batch.
    pub fn clear(&self) {
        self.tx.send_replace(TranscriptFeed::default());
    }
}
