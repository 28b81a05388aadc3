//! Presence gateway client for navicord.
//!
//! Holds one authenticated gateway session, keeps it alive with
//! heartbeats, reconnects with backoff, and publishes now-playing
//! activities with uploaded album art.

pub mod assets;
pub mod gateway;
pub mod presence;

#[cfg(test)]
pub(crate) mod test_support;

pub use assets::{AssetRef, AssetResolver, AssetUploader, HttpAssetUploader};
pub use gateway::{ConnectionState, GatewayClient, GatewayEvent, SendOutcome};
pub use presence::{PresencePublisher, PublishOutcome};
