use std::sync::Arc;
use tokio::sync::watch;
use voicelink_types::{CallState, ConnectionPhase};

/// Single source of truth for call status.
///
/// Every mutation is one `send_modify`, so a phase change and the matching
/// `last_error` update reach subscribers together.
#[derive(Debug, Clone)]
pub struct CallStateStore {
    tx: Arc<watch::Sender<CallState>>,
}

impl Default for CallStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CallState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> CallState {
        self.tx.borrow().clone()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.tx.borrow().phase
    }

    pub fn begin_connecting(&self) {
        self.enter(ConnectionPhase::Connecting);
    }

    pub fn mark_connected(&self) {
        self.enter(ConnectionPhase::Connected);
    }

    /// The transport ended the session. Media flags return to their defaults.
    pub fn mark_disconnected(&self) {
        self.tx.send_modify(|state| {
            *state = CallState {
                phase: ConnectionPhase::Disconnected,
                ..CallState::default()
            };
        });
    }

    /// Enters the error phase with a human-readable reason.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.phase = ConnectionPhase::Error;
            state.agent_speaking = false;
            state.last_error = Some(message);
        });
    }

    pub fn set_mic_enabled(&self, enabled: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.mic_enabled != enabled;
            state.mic_enabled = enabled;
            changed
        });
    }

    pub fn set_agent_speaking(&self, speaking: bool) {
        self.tx.send_if_modified(|state| {
            let changed = state.agent_speaking != speaking;
            state.agent_speaking = speaking;
            changed
        });
    }

    /// Restores the initial record.
    pub fn reset(&self) {
        self.tx.send_replace(CallState::default());
    }

    fn enter(&self, phase: ConnectionPhase) {
        self.tx.send_modify(|state| {
            state.phase = phase;
            state.last_error = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entering_non_error_phase_clears_error() {
        let store = CallStateStore::new();
        store.fail("boom");
        assert_eq!(store.phase(), ConnectionPhase::Error);
        assert_eq!(store.snapshot().last_error.as_deref(), Some("boom"));

        store.begin_connecting();
        let state = store.snapshot();
        assert_eq!(state.phase, ConnectionPhase::Connecting);
        assert!(state.last_error.is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn subscribers_never_see_mixed_records() {
        let store = CallStateStore::new();
        let mut rx = store.subscribe();

        store.fail("join failed");
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_consistent());

        store.mark_connected();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.phase, ConnectionPhase::Connected);
        assert!(seen.is_consistent());
    }

    #[test]
    fn mark_disconnected_restores_media_defaults() {
        let store = CallStateStore::new();
        store.mark_connected();
        store.set_mic_enabled(false);
        store.set_agent_speaking(true);

        store.mark_disconnected();
        let state = store.snapshot();
        assert_eq!(state.phase, ConnectionPhase::Disconnected);
        assert!(state.mic_enabled);
        assert!(!state.agent_speaking);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn unchanged_flags_do_not_notify() {
        let store = CallStateStore::new();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.set_mic_enabled(true);
        store.set_agent_speaking(false);
        assert!(!rx.has_changed().unwrap());

        store.set_agent_speaking(true);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn reset_restores_initial_values() {
        let store = CallStateStore::new();
        store.mark_connected();
        store.set_mic_enabled(false);
        store.fail("lost");

        store.reset();
        assert_eq!(store.snapshot(), CallState::default());
    }

    #[test]
    fn clones_share_state() {
        let store = CallStateStore::new();
        let other = store.clone();
        other.mark_connected();
        assert_eq!(store.phase(), ConnectionPhase::Connected);
    }
}
