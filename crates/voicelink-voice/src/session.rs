//! Media session manager.
//!
//! One actor task owns the live session, the remote audio attachments and
//! the side-channel decoder. Commands from [`VoiceSessionHandle`]s and
//! events from the transport are queued to that task and handled one at a
//! time, so every projection update made by a handler is atomic with
//! respect to every other handler.
//!
//! Each `connect()` starts an *attempt* with its own id. The credential fetch
//! and join run in a spawned task and report back through the queue; events
//! of the joined session are tagged with the attempt id. Anything that
//! arrives for an attempt that is no longer current is discarded, which is
//! how a `disconnect()` issued mid-connect stays safe once the join settles.

use crate::attachments::AudioAttachments;
use crate::config::{SessionConfig, SessionOptions};
use crate::credential::{CredentialSource, HttpCredentialFetcher};
use crate::error::{ConnectError, CredentialError, MicToggleError, SessionError};
use crate::projection::{CallStateStore, TranscriptStore};
use crate::transport::{Transport, TransportEvent, TransportEvents, TransportSession, TrackKind};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;
use voicelink_protocol::{SideChannelDecoder, SideChannelEvent};
use voicelink_types::{CallState, ConnectionPhase, TranscriptFeed};

/// Capacity of the handle → actor command queue.
const COMMAND_QUEUE_CAPACITY: usize = 32;

/// Default capacity for the notice broadcast channel.
const DEFAULT_NOTICE_BROADCAST_CAPACITY: usize = 64;

/// Source of arrival timestamps (Unix milliseconds) for side-channel frames.
pub type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default())
}

/// Transient conditions worth showing to the user. Never changes the phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// Enabling or disabling the microphone failed.
    MicrophoneFailed { message: String },
    Reconnecting,
    Reconnected,
}

enum Command {
    Connect(oneshot::Sender<()>),
    Disconnect(oneshot::Sender<()>),
    ToggleMicrophone(oneshot::Sender<Result<bool, MicToggleError>>),
    ClearTranscript(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

type JoinOutcome = Result<(Box<dyn TransportSession>, TransportEvents), ConnectError>;

enum Internal {
    Settled { attempt: Uuid, outcome: JoinOutcome },
    Transport { attempt: Uuid, event: TransportEvent },
}

/// Builder for a session manager.
pub struct SessionManager {
    config: SessionConfig,
    credentials: Arc<dyn CredentialSource>,
    transport: Arc<dyn Transport>,
    call: CallStateStore,
    transcript: TranscriptStore,
    clock: Clock,
}

impl SessionManager {
    pub fn new(
        config: SessionConfig,
        credentials: Arc<dyn CredentialSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
            call: CallStateStore::new(),
            transcript: TranscriptStore::new(),
            clock: system_clock(),
        }
    }

    /// Fetches credentials over HTTP from `config.issuer_url`.
    pub fn from_config(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, CredentialError> {
        let credentials = HttpCredentialFetcher::from_config(&config)?;
        Ok(Self::new(config, Arc::new(credentials), transport))
    }

    /// Uses existing projections instead of fresh ones.
    pub fn with_projections(mut self, call: CallStateStore, transcript: TranscriptStore) -> Self {
        self.call = call;
        self.transcript = transcript;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Starts the actor on the current tokio runtime.
    ///
    /// The actor stops, after tearing the session down, when [`shutdown`]
    /// is called or the last handle is dropped.
    ///
    /// [`shutdown`]: VoiceSessionHandle::shutdown
    pub fn spawn(self) -> VoiceSessionHandle {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(DEFAULT_NOTICE_BROADCAST_CAPACITY);

        let handle = VoiceSessionHandle {
            commands: commands_tx,
            call: self.call.clone(),
            transcript: self.transcript.clone(),
            notices: notices.clone(),
        };

        let actor = Actor {
            decoder: SideChannelDecoder::new(self.config.delivery_ids),
            config: self.config,
            credentials: self.credentials,
            transport: self.transport,
            call: self.call,
            transcript: self.transcript,
            clock: self.clock,
            notices,
            attachments: AudioAttachments::new(),
            attempt: None,
            internal_tx,
        };
        info!(
            room = %actor.config.room_name,
            delivery_ids = ?actor.decoder.scheme(),
            "voice session manager started"
        );
        tokio::spawn(actor.run(commands_rx, internal_rx));

        handle
    }
}

/// Cloneable control surface for one session manager.
///
/// Presentation layers read state through [`call_state`](Self::call_state),
/// [`transcript`](Self::transcript) and [`notices`](Self::notices); the only
/// mutations are the methods below.
#[derive(Clone)]
pub struct VoiceSessionHandle {
    commands: mpsc::Sender<Command>,
    call: CallStateStore,
    transcript: TranscriptStore,
    notices: broadcast::Sender<SessionNotice>,
}

impl VoiceSessionHandle {
    /// Starts a connect attempt. No-op while connecting or connected.
    ///
    /// Returns once the attempt has started; watch [`call_state`](Self::call_state)
    /// for the outcome.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.request(Command::Connect).await
    }

    /// Leaves the session and resets call state. Safe to repeat.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(Command::Disconnect).await
    }

    /// Flips the microphone while connected and returns the resulting state.
    pub async fn toggle_microphone(&self) -> Result<bool, SessionError> {
        Ok(self.request(Command::ToggleMicrophone).await??)
    }

    /// Empties the transcript and citations.
    pub async fn clear_transcript(&self) -> Result<(), SessionError> {
        self.request(Command::ClearTranscript).await
    }

    /// Tears down like `disconnect()` and stops the actor.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.request(Command::Shutdown).await
    }

    pub fn call_state(&self) -> watch::Receiver<CallState> {
        self.call.subscribe()
    }

    pub fn transcript(&self) -> watch::Receiver<TranscriptFeed> {
        self.transcript.subscribe()
    }

    pub fn notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)
    }
}

struct Attempt {
    id: Uuid,
    session: Option<Box<dyn TransportSession>>,
    forwarder: Option<JoinHandle<()>>,
}

struct Actor {
    config: SessionConfig,
    credentials: Arc<dyn CredentialSource>,
    transport: Arc<dyn Transport>,
    call: CallStateStore,
    transcript: TranscriptStore,
    clock: Clock,
    notices: broadcast::Sender<SessionNotice>,
    decoder: SideChannelDecoder,
    attachments: AudioAttachments,
    attempt: Option<Attempt>,
    internal_tx: mpsc::UnboundedSender<Internal>,
}

impl Actor {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut internal: mpsc::UnboundedReceiver<Internal>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command).await {
                            break;
                        }
                    }
                    None => {
                        self.disconnect().await;
                        break;
                    }
                },
                Some(message) = internal.recv() => self.handle_internal(message).await,
            }
        }
        self.drain(internal).await;
        info!("voice session manager stopped");
    }

    /// Settles joins that were queued but not yet handled when the loop
    /// stopped. Later joins see the closed queue and leave on their own.
    async fn drain(&mut self, mut internal: mpsc::UnboundedReceiver<Internal>) {
        internal.close();
        while let Ok(message) = internal.try_recv() {
            if let Internal::Settled { attempt, outcome } = message {
                self.on_settled(attempt, outcome).await;
            }
        }
    }

    /// Returns `false` once the actor should stop.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Connect(reply) => {
                self.connect();
                let _ = reply.send(());
            }
            Command::Disconnect(reply) => {
                self.disconnect().await;
                let _ = reply.send(());
            }
            Command::ToggleMicrophone(reply) => {
                let result = self.toggle_microphone().await;
                let _ = reply.send(result);
            }
            Command::ClearTranscript(reply) => {
                self.transcript.clear();
                let _ = reply.send(());
            }
            Command::Shutdown(reply) => {
                self.disconnect().await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    async fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Settled { attempt, outcome } => self.on_settled(attempt, outcome).await,
            Internal::Transport { attempt, event } => {
                if self.current_attempt() == Some(attempt) {
                    self.on_transport_event(event).await;
                } else {
                    debug!(%attempt, ?event, "dropping event from a stale session");
                }
            }
        }
    }

    fn current_attempt(&self) -> Option<Uuid> {
        self.attempt.as_ref().map(|a| a.id)
    }

    fn session(&self) -> Option<&dyn TransportSession> {
        self.attempt.as_ref().and_then(|a| a.session.as_deref())
    }

    fn connect(&mut self) {
        let phase = self.call.phase();
        if phase.is_active() {
            debug!(%phase, "connect ignored; attempt already active");
            return;
        }

        let id = Uuid::new_v4();
        let room = self.config.room_name.clone();
        self.call.begin_connecting();
        self.attempt = Some(Attempt {
            id,
            session: None,
            forwarder: None,
        });

        let credentials = Arc::clone(&self.credentials);
        let transport = Arc::clone(&self.transport);
        let participant = self.config.participant_name.clone();
        let options = self.config.capture;
        let internal_tx = self.internal_tx.clone();
        let span = info_span!("voice_attempt", attempt = %id, room = %room);

        tokio::spawn(
            async move {
                info!("connecting");
                let outcome = establish(
                    credentials.as_ref(),
                    transport.as_ref(),
                    &room,
                    participant.as_deref(),
                    &options,
                )
                .await;
                let settled = internal_tx.send(Internal::Settled {
                    attempt: id,
                    outcome,
                });
                // The manager stopped while the join was in flight.
                if let Err(mpsc::error::SendError(Internal::Settled {
                    outcome: Ok((session, _events)),
                    ..
                })) = settled
                {
                    info!("leaving session joined after shutdown");
                    session.leave().await;
                }
            }
            .instrument(span),
        );
    }

    async fn on_settled(&mut self, attempt: Uuid, outcome: JoinOutcome) {
        if self.current_attempt() != Some(attempt) {
            if let Ok((session, _events)) = outcome {
                info!(%attempt, "leaving session joined after disconnect");
                session.leave().await;
            }
            return;
        }

        match outcome {
            Ok((session, events)) => {
                let forwarder = self.forward_events(attempt, events);
                if let Some(current) = self.attempt.as_mut() {
                    current.session = Some(session);
                    current.forwarder = Some(forwarder);
                }
            }
            Err(e) => {
                error!(%attempt, error = %e, "connect attempt failed");
                self.fail(e.to_string()).await;
            }
        }
    }

    fn forward_events(&self, attempt: Uuid, mut events: TransportEvents) -> JoinHandle<()> {
        let internal_tx = self.internal_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if internal_tx
                    .send(Internal::Transport { attempt, event })
                    .is_err()
                {
                    return;
                }
            }
            let _ = internal_tx.send(Internal::Transport {
                attempt,
                event: TransportEvent::Disconnected {
                    reason: Some("event stream closed".to_string()),
                },
            });
        })
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                if self.call.phase() != ConnectionPhase::Connecting {
                    debug!("duplicate connected event ignored");
                    return;
                }
                self.call.mark_connected();
                info!("connected");
                self.enable_microphone_on_join().await;
            }
            TransportEvent::Disconnected { reason } => {
                info!(
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "transport disconnected"
                );
                self.teardown(false).await;
                self.call.mark_disconnected();
            }
            TransportEvent::Failed { message } => {
                error!(%message, "transport failure");
                self.fail(message).await;
            }
            TransportEvent::Reconnecting => {
                warn!("transport reconnecting");
                let _ = self.notices.send(SessionNotice::Reconnecting);
            }
            TransportEvent::Reconnected => {
                info!("transport reconnected");
                let _ = self.notices.send(SessionNotice::Reconnected);
            }
            TransportEvent::TrackSubscribed(track) => {
                if track.kind != TrackKind::Audio {
                    debug!(track_id = %track.sid, "ignoring non-audio track");
                    return;
                }
                let Some(session) = self.session() else {
                    return;
                };
                match session.attach_audio(&track) {
                    Ok(handle) => {
                        self.attachments.insert(handle);
                        debug!(track_id = %track.sid, participant = %track.participant, "attached remote audio");
                    }
                    Err(e) => warn!(track_id = %track.sid, error = %e, "could not attach remote audio"),
                }
                self.call.set_agent_speaking(!self.attachments.is_empty());
            }
            TransportEvent::TrackUnsubscribed(track) => {
                let released = self.attachments.remove(&track.sid);
                debug!(track_id = %track.sid, released, "detached remote audio");
                self.call.set_agent_speaking(!self.attachments.is_empty());
            }
            TransportEvent::DataReceived { payload, participant } => {
                self.on_data(&payload, participant.as_deref());
            }
        }
    }

    fn on_data(&mut self, payload: &[u8], participant: Option<&str>) {
        let arrival_ms = (self.clock)();
        match self.decoder.decode(payload, arrival_ms) {
            Ok(SideChannelEvent::Transcript(message)) => {
                let update = self.transcript.append_or_update(message);
                debug!(?update, "transcript frame applied");
            }
            Ok(SideChannelEvent::Citations { sources, query }) => {
                debug!(count = sources.len(), "citation batch received");
                self.transcript.replace_citations(sources, query);
            }
            Err(e) => {
                debug!(participant, bytes = payload.len(), error = %e, "dropping side-channel frame");
            }
        }
    }

    async fn enable_microphone_on_join(&mut self) {
        let Some(session) = self.session() else {
            return;
        };
        match session.set_microphone_enabled(true).await {
            Ok(()) => self.call.set_mic_enabled(true),
            Err(e) => {
                let error = MicToggleError::new(true, e);
                warn!(error = %error, "microphone could not be enabled on join");
                self.call.set_mic_enabled(false);
                let _ = self.notices.send(SessionNotice::MicrophoneFailed {
                    message: error.to_string(),
                });
            }
        }
    }

    async fn toggle_microphone(&mut self) -> Result<bool, MicToggleError> {
        let state = self.call.snapshot();
        let session = match (state.phase, self.session()) {
            (ConnectionPhase::Connected, Some(session)) => session,
            _ => return Ok(state.mic_enabled),
        };

        let desired = !state.mic_enabled;
        match session.set_microphone_enabled(desired).await {
            Ok(()) => {
                self.call.set_mic_enabled(desired);
                info!(enabled = desired, "microphone toggled");
                Ok(desired)
            }
            Err(e) => {
                let error = MicToggleError::new(desired, e);
                warn!(error = %error, "microphone toggle failed");
                let _ = self.notices.send(SessionNotice::MicrophoneFailed {
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    async fn disconnect(&mut self) {
        self.teardown(true).await;
        self.call.reset();
    }

    async fn fail(&mut self, message: String) {
        self.teardown(true).await;
        self.call.fail(message);
    }

    /// Drops the current attempt: stops event forwarding, releases every
    /// playback handle and optionally asks the transport to leave.
    async fn teardown(&mut self, leave: bool) {
        let released = self.attachments.clear();
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        if let Some(forwarder) = attempt.forwarder {
            forwarder.abort();
        }
        if let Some(session) = attempt.session {
            if leave {
                session.leave().await;
            }
        }
        info!(attempt = %attempt.id, released, "session torn down");
    }
}

async fn establish(
    credentials: &dyn CredentialSource,
    transport: &dyn Transport,
    room: &str,
    participant: Option<&str>,
    options: &SessionOptions,
) -> JoinOutcome {
    let credential = credentials.fetch_credential(room, participant).await?;
    info!(identity = %credential.identity, url = %credential.transport_url, "credential issued");
    let joined = transport.join(&credential, options).await?;
    Ok(joined)
}
