use crate::transport::PlaybackHandle;
use std::collections::HashMap;
use std::fmt;

/// Playback handles for the currently subscribed remote audio tracks.
///
/// Handles are owned here and released by dropping them, so removing a
/// track or clearing the set twice never releases anything twice.
#[derive(Default)]
pub struct AudioAttachments {
    tracks: HashMap<String, Vec<Box<dyn PlaybackHandle>>>,
}

impl AudioAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: Box<dyn PlaybackHandle>) {
        self.tracks
            .entry(handle.track_sid().to_string())
            .or_default()
            .push(handle);
    }

    /// Releases every handle for `track_sid`. Returns how many were released.
    pub fn remove(&mut self, track_sid: &str) -> usize {
        self.tracks.remove(track_sid).map_or(0, |handles| handles.len())
    }

    /// Releases all handles. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.len();
        self.tracks.clear();
        released
    }

    /// Number of attached handles across all tracks.
    pub fn len(&self) -> usize {
        self.tracks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Debug for AudioAttachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tracks: Vec<(&str, usize)> = self
            .tracks
            .iter()
            .map(|(sid, handles)| (sid.as_str(), handles.len()))
            .collect();
        tracks.sort_unstable();
        f.debug_struct("AudioAttachments")
            .field("tracks", &tracks)
            .finish()
    }
}
