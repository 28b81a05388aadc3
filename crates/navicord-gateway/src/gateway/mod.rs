//! Presence gateway client.
//!
//! Maintains one authenticated WebSocket session at a time: discovery,
//! Hello/Identify/Ready handshake, heartbeats, and reconnection with
//! exponential backoff. Presence updates only go out while Ready.

mod backoff;
mod client;
mod connection;
mod handler;
mod heartbeat;
pub mod protocol;
mod session;
mod shared;
mod state;
mod transport;
mod types;


pub use backoff::Backoff;
pub use client::GatewayClient;
pub use protocol::{
    Activity, ActivityAssets, ActivityTimestamps, GatewayFrame, Inbound, PresencePayload,
};
pub use state::ConnectionState;
pub use transport::{gateway_url, Connector, FrameSink, FrameStream, WsConnector};
pub use types::{GatewayEvent, SendOutcome};
