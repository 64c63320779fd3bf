//! Client-visible state projections.
//!
//! Both stores are owned values: create one per session (or share one
//! between sessions on purpose) and hand clones to whoever needs to read.
//! Readers subscribe through `tokio::sync::watch`, so they always see a
//! whole record and never a half-applied mutation.

mod call;
mod transcript;

pub use call::CallStateStore;
pub use transcript::{TranscriptStore, TranscriptUpdate};
