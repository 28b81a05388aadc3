//! Connection lifecycle states.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the gateway connection.
///
/// `Disconnected -> Connecting -> AwaitingHello -> Identifying ->
/// AwaitingReady -> Ready -> (Closing) -> Disconnected`, looping until the
/// client is shut down.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected = 0,
    Connecting = 1,
    AwaitingHello = 2,
    Identifying = 3,
    AwaitingReady = 4,
    Ready = 5,
    Closing = 6,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::AwaitingHello,
            3 => Self::Identifying,
            4 => Self::AwaitingReady,
            5 => Self::Ready,
            6 => Self::Closing,
            _ => Self::Disconnected,
        }
    }

    pub fn is_ready(self) -> bool {
        self == Self::Ready
    }

    /// Whether a session exists in this state.
    pub fn has_session(self) -> bool {
        self != Self::Disconnected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Identifying => "identifying",
            Self::AwaitingReady => "awaiting_ready",
            Self::Ready => "ready",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free cell holding the current state.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub(crate) fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Store `state`, returning the previous one.
    pub(crate) fn replace(&self, state: ConnectionState) -> ConnectionState {
        ConnectionState::from_u8(self.0.swap(state as u8, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_round_trips_every_state() {
        let cell = StateCell::new(ConnectionState::Disconnected);
        for state in [
            ConnectionState::Connecting,
            ConnectionState::AwaitingHello,
            ConnectionState::Identifying,
            ConnectionState::AwaitingReady,
            ConnectionState::Ready,
            ConnectionState::Closing,
            ConnectionState::Disconnected,
        ] {
            let previous = cell.get();
            assert_eq!(cell.replace(state), previous);
            assert_eq!(cell.get(), state);
        }
    }

    #[test]
    fn only_ready_is_ready() {
        assert!(ConnectionState::Ready.is_ready());
        assert!(!ConnectionState::AwaitingReady.is_ready());
        assert!(!ConnectionState::Disconnected.has_session());
        assert!(ConnectionState::Closing.has_session());
        assert_eq!(ConnectionState::AwaitingHello.to_string(), "awaiting_hello");
    }
}
