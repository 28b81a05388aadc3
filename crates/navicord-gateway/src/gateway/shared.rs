//! State shared by the driver, the heartbeat task and client handles.
//!
//! All socket writes go through [`Shared::send`], which holds the writer
//! lock for the duration of the write. Teardown takes the same lock, so a
//! sender either completes on a live socket or sees no socket at all.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use navicord_config::schema::GatewayConfig;
use tokio::sync::{broadcast, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::protocol::GatewayFrame;
use super::session::Session;
use super::state::{ConnectionState, StateCell};
use super::transport::FrameSink;
use super::types::{GatewayEvent, SendOutcome};

const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);
const NO_SESSION: u64 = 0;

/// Which sends are allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SendGate {
    /// Handshake and heartbeat frames: the named session must still be the active one.
    Session(u64),
    /// Presence frames: the active session must be Ready.
    Ready,
}

struct SessionWriter {
    session: Arc<Session>,
    sink: FrameSink,
}

pub(crate) struct Shared {
    pub(crate) config: GatewayConfig,
    state: StateCell,
    active_session: AtomicU64,
    session_ids: AtomicU64,
    writer: Mutex<Option<SessionWriter>>,
    events: broadcast::Sender<GatewayEvent>,
    pub(crate) shutdown: CancellationToken,
}

impl Shared {
    pub(crate) fn new(config: GatewayConfig) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            config,
            state: StateCell::new(ConnectionState::Disconnected),
            active_session: AtomicU64::new(NO_SESSION),
            session_ids: AtomicU64::new(NO_SESSION + 1),
            writer: Mutex::new(None),
            events,
            shutdown: CancellationToken::new(),
        }
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state.get()
    }

    pub(crate) fn transition(&self, to: ConnectionState) {
        let from = self.state.replace(to);
        if from != to {
            debug!(from = %from, to = %to, "Gateway state changed");
            self.emit(GatewayEvent::StateChanged { from, to });
        }
    }

    pub(crate) fn emit(&self, event: GatewayEvent) {
        let _ = self.events.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    /// Ids increase per client, starting at 1.
    pub(crate) fn next_session_id(&self) -> u64 {
        self.session_ids.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn is_active(&self, session_id: u64) -> bool {
        self.active_session.load(Ordering::Acquire) == session_id
    }

    /// Make `session` the one all sends go to.
    pub(crate) async fn install(&self, session: Arc<Session>, sink: FrameSink) {
        let mut writer = self.writer.lock().await;
        self.active_session.store(session.id, Ordering::Release);
        *writer = Some(SessionWriter { session, sink });
    }

    /// Write one frame, serialized with every other writer.
    pub(crate) async fn send(&self, frame: &GatewayFrame, gate: SendGate) -> SendOutcome {
        let message = match frame.to_message() {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, op = frame.op, "Dropping unserializable frame");
                return SendOutcome::Failed;
            }
        };

        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            return SendOutcome::NotReady;
        };

        let allowed = match gate {
            SendGate::Session(id) => writer.session.id == id,
            SendGate::Ready => self.state().is_ready(),
        };
        if !allowed {
            return SendOutcome::NotReady;
        }

        match writer.sink.send(message).await {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                warn!(
                    session = writer.session.id,
                    op = frame.op,
                    error = %e,
                    "Gateway write failed"
                );
                writer.session.mark_failed();
                SendOutcome::Failed
            }
        }
    }

    /// Discard the session's socket and return to Disconnected.
    pub(crate) async fn teardown(&self, session_id: u64) {
        let mut guard = self.writer.lock().await;
        self.transition(ConnectionState::Closing);
        self.active_session
            .compare_exchange(
                session_id,
                NO_SESSION,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .ok();

        let owned = guard
            .as_ref()
            .is_some_and(|writer| writer.session.id == session_id);
        if owned {
            if let Some(mut writer) = guard.take() {
                // Best effort: the peer may already be gone.
                let _ = tokio::time::timeout(CLOSE_TIMEOUT, async {
                    let _ = writer.sink.send(Message::Close(None)).await;
                    let _ = writer.sink.close().await;
                })
                .await;
            }
        }
        self.transition(ConnectionState::Disconnected);
    }
}
