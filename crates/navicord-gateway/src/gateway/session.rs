//! Per-connection state shared between the driver, heartbeat and senders.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

const NO_SEQUENCE: i64 = -1;

/// One attempt at a live connection. A new session starts with no sequence number.
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) id: u64,
    sequence: AtomicI64,
    heartbeat_interval_ms: AtomicU64,
    awaiting_ack: AtomicBool,
    failed: Notify,
}

impl Session {
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            sequence: AtomicI64::new(NO_SEQUENCE),
            heartbeat_interval_ms: AtomicU64::new(0),
            awaiting_ack: AtomicBool::new(false),
            failed: Notify::new(),
        }
    }

    pub(crate) fn sequence(&self) -> Option<u64> {
        let seq = self.sequence.load(Ordering::Acquire);
        u64::try_from(seq).ok()
    }

    pub(crate) fn observe_sequence(&self, seq: u64) {
        let seq = i64::try_from(seq).unwrap_or(i64::MAX);
        self.sequence.fetch_max(seq, Ordering::AcqRel);
    }

    pub(crate) fn set_heartbeat_interval(&self, interval: Duration) {
        let ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.heartbeat_interval_ms.store(ms, Ordering::Release);
    }

    pub(crate) fn heartbeat_interval(&self) -> Option<Duration> {
        match self.heartbeat_interval_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Record an outgoing heartbeat. Returns whether the previous one was never acknowledged.
    pub(crate) fn beat_sent(&self) -> bool {
        self.awaiting_ack.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn ack_pending(&self) -> bool {
        self.awaiting_ack.load(Ordering::Acquire)
    }

    pub(crate) fn ack_received(&self) {
        self.awaiting_ack.store(false, Ordering::Release);
    }

    /// Flag the session as broken. The driver tears it down on its next poll.
    pub(crate) fn mark_failed(&self) {
        self.failed.notify_one();
    }

    pub(crate) fn failed(&self) -> Notified<'_> {
        self.failed.notified()
    }
}
