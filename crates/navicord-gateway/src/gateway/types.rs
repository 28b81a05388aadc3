//! Events and outcomes reported by the gateway client.

use std::time::Duration;

use super::state::ConnectionState;

/// Events emitted by the gateway client for observers.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    StateChanged {
        from: ConnectionState,
        to: ConnectionState,
    },
    /// The driver is about to sleep `delay` before connection attempt `attempt`.
    Reconnecting { attempt: u32, delay: Duration },
    /// Handshake completed; presence updates are accepted.
    Ready { session: u64 },
    /// A session ended and was discarded.
    Disconnected { session: u64, reason: String },
    /// The driver exited after shutdown.
    Stopped,
}

/// Result of handing a frame to the send path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    /// No ready session; nothing was written.
    NotReady,
    /// The write failed; the session has been flagged for teardown.
    Failed,
}
