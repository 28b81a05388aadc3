//! Keep-alive task started when Hello arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use super::protocol::GatewayFrame;
use super::session::Session;
use super::shared::{SendGate, Shared};
use super::types::SendOutcome;

pub(crate) fn spawn(shared: Arc<Shared>, session: Arc<Session>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(heartbeat_task(shared, session, interval))
}

/// Emit a heartbeat every `interval` until the session stops being the
/// active one or a write fails. Never touches connection state itself.
async fn heartbeat_task(shared: Arc<Shared>, session: Arc<Session>, interval: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if !shared.is_active(session.id) {
            debug!(session = session.id, "Session superseded, stopping heartbeat");
            break;
        }

        if shared.config.reconnect_on_missed_ack && session.ack_pending() {
            warn!(session = session.id, "Heartbeat not acknowledged, failing session");
            session.mark_failed();
            break;
        }

        // The ACK can arrive before send() returns.
        session.beat_sent();
        if send_heartbeat(&shared, &session).await != SendOutcome::Sent {
            debug!(session = session.id, "Heartbeat send failed, stopping");
            break;
        }
    }
}

/// Send one heartbeat carrying the session's last sequence number.
///
/// Only the scheduler arms the missed-ACK check; a reply to a server
/// request does not.
pub(crate) async fn send_heartbeat(shared: &Shared, session: &Session) -> SendOutcome {
    let sequence = session.sequence();
    let outcome = shared
        .send(&GatewayFrame::heartbeat(sequence), SendGate::Session(session.id))
        .await;
    if outcome == SendOutcome::Sent {
        trace!(session = session.id, sequence = ?sequence, "Heartbeat sent");
    }
    outcome
}
