//! Inbound frame handling during handshake and while Ready.

use std::sync::Arc;
use std::time::Duration;

use navicord_common::GatewayError;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::heartbeat;
use super::protocol::{GatewayFrame, Inbound, READY_EVENT};
use super::session::Session;
use super::shared::{SendGate, Shared};
use super::state::ConnectionState;
use super::types::SendOutcome;

/// What the driver should do after a frame.
#[derive(Debug)]
pub(crate) enum Flow {
    Continue,
    /// The session just reached Ready.
    Ready,
    EndSession(GatewayError),
}

/// Handle a single inbound frame for `session`.
pub(crate) async fn handle_frame(
    shared: &Arc<Shared>,
    session: &Arc<Session>,
    frame: GatewayFrame,
    heartbeat_task: &mut Option<JoinHandle<()>>,
) -> Flow {
    if let Some(seq) = frame.s {
        session.observe_sequence(seq);
    }

    let inbound = match frame.classify() {
        Ok(inbound) => inbound,
        Err(e) => {
            warn!(session = session.id, error = %e, "Ignoring malformed gateway frame");
            return Flow::Continue;
        }
    };

    match inbound {
        Inbound::Hello {
            heartbeat_interval_ms,
        } => on_hello(shared, session, heartbeat_interval_ms, heartbeat_task).await,
        Inbound::HeartbeatAck => {
            session.ack_received();
            trace!(session = session.id, "Heartbeat acknowledged");
            Flow::Continue
        }
        Inbound::HeartbeatRequest => {
            debug!(session = session.id, "Server requested a heartbeat");
            match heartbeat::send_heartbeat(shared, session).await {
                SendOutcome::Failed => {
                    Flow::EndSession(GatewayError::Transport("heartbeat write failed".into()))
                }
                _ => Flow::Continue,
            }
        }
        Inbound::Dispatch { event } => on_dispatch(shared, session, event.as_deref(), &frame),
        Inbound::Reconnect => {
            info!(session = session.id, "Server requested reconnect");
            Flow::EndSession(GatewayError::Closed("server requested reconnect".into()))
        }
        Inbound::InvalidSession => {
            warn!(session = session.id, "Server invalidated the session");
            Flow::EndSession(GatewayError::Protocol("invalid session".into()))
        }
        Inbound::Unknown(op) => {
            debug!(session = session.id, op, "Ignoring unrecognized opcode");
            Flow::Continue
        }
    }
}

async fn on_hello(
    shared: &Arc<Shared>,
    session: &Arc<Session>,
    interval_ms: u64,
    heartbeat_task: &mut Option<JoinHandle<()>>,
) -> Flow {
    if shared.state() != ConnectionState::AwaitingHello {
        debug!(session = session.id, state = %shared.state(), "Ignoring Hello outside handshake");
        return Flow::Continue;
    }

    let interval = Duration::from_millis(interval_ms);
    session.set_heartbeat_interval(interval);
    if let Some(previous) = heartbeat_task.replace(heartbeat::spawn(
        Arc::clone(shared),
        Arc::clone(session),
        interval,
    )) {
        previous.abort();
    }
    debug!(session = session.id, interval_ms, "Hello received, heartbeat started");

    shared.transition(ConnectionState::Identifying);
    let identify = GatewayFrame::identify(&shared.config.token, &shared.config.identify);
    match shared.send(&identify, SendGate::Session(session.id)).await {
        SendOutcome::Sent => {
            shared.transition(ConnectionState::AwaitingReady);
            Flow::Continue
        }
        _ => Flow::EndSession(GatewayError::Transport("identify write failed".into())),
    }
}

fn on_dispatch(
    shared: &Shared,
    session: &Session,
    event: Option<&str>,
    frame: &GatewayFrame,
) -> Flow {
    if event != Some(READY_EVENT) {
        trace!(session = session.id, event = ?event, "Ignoring dispatch");
        return Flow::Continue;
    }
    if shared.state() != ConnectionState::AwaitingReady {
        debug!(session = session.id, state = %shared.state(), "Ignoring Ready outside handshake");
        return Flow::Continue;
    }

    let user = frame
        .d
        .get("user")
        .and_then(|u| u.get("username"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");
    shared.transition(ConnectionState::Ready);
    info!(session = session.id, user = %user, "Gateway session ready");
    Flow::Ready
}
