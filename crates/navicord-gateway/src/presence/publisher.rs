//! Publishes now-playing updates over the gateway.

use std::sync::Arc;

use navicord_common::{GatewayError, PresenceUpdate, Result};
use navicord_config::schema::PresenceConfig;
use navicord_config::NavicordConfig;
use tracing::{debug, info, warn};

use super::activity::{build_activity, presence_payload};
use crate::assets::{AssetResolver, HttpAssetUploader};
use crate::gateway::{GatewayClient, SendOutcome};

/// Result of a publish or clear call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent,
    /// No Ready session (handshake in progress or reconnecting). Nothing
    /// was sent and the update is not queued.
    NotReady,
    /// The write failed. The session is flagged and will be replaced.
    Dropped,
}

impl From<SendOutcome> for PublishOutcome {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Sent => Self::Sent,
            SendOutcome::NotReady => Self::NotReady,
            SendOutcome::Failed => Self::Dropped,
        }
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Turns [`PresenceUpdate`]s into presence frames, one frame per call.
#[derive(Debug, Clone)]
pub struct PresencePublisher {
    gateway: GatewayClient,
    assets: AssetResolver,
    application_id: String,
    settings: PresenceConfig,
}

impl PresencePublisher {
    pub fn new(
        gateway: GatewayClient,
        assets: AssetResolver,
        application_id: impl Into<String>,
        settings: PresenceConfig,
    ) -> Self {
        Self {
            gateway,
            assets,
            application_id: application_id.into(),
            settings,
        }
    }

    /// Publisher backed by the production gateway connector and asset uploader.
    /// The gateway is not started.
    pub fn from_config(config: &NavicordConfig) -> Self {
        let gateway = GatewayClient::new(config.gateway.clone(), config.backoff.clone());
        let uploader = Arc::new(HttpAssetUploader::new(&config.gateway, &config.assets));
        let assets = AssetResolver::new(uploader, config.assets.fallback_image_url.clone());
        Self::new(
            gateway,
            assets,
            config.gateway.application_id.clone(),
            config.presence.clone(),
        )
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    /// Show `update` as the current activity.
    ///
    /// Returns `NotReady` without touching the network unless the session
    /// is Ready. Art is resolved before the send path is entered.
    ///
    /// Errors with [`GatewayError::NotConnected`] after shutdown, or with an
    /// asset error when neither the art nor the fallback image could be
    /// resolved. The connection is unaffected either way.
    pub async fn publish(&self, update: &PresenceUpdate) -> Result<PublishOutcome> {
        self.ensure_running()?;
        if !self.gateway.is_ready() {
            debug!(title = %update.title, "Gateway not ready, dropping update");
            return Ok(PublishOutcome::NotReady);
        }

        let asset = self
            .assets
            .resolve(update.art_url.as_deref())
            .await
            .inspect_err(|e| warn!(title = %update.title, error = %e, "Could not resolve album art"))?;

        let activity = build_activity(update, &self.application_id, &self.settings, &asset);
        let payload = presence_payload(vec![activity], &self.settings);
        let outcome = PublishOutcome::from(self.gateway.send_presence(&payload).await);

        match outcome {
            PublishOutcome::Sent => {
                info!(title = %update.title, artist = %update.artist, "Presence updated")
            }
            PublishOutcome::NotReady => debug!("Session left Ready before the update was sent"),
            PublishOutcome::Dropped => warn!(title = %update.title, "Presence update dropped"),
        }
        Ok(outcome)
    }

    /// Remove the current activity.
    pub async fn clear(&self) -> Result<PublishOutcome> {
        self.ensure_running()?;
        if !self.gateway.is_ready() {
            return Ok(PublishOutcome::NotReady);
        }
        let payload = presence_payload(Vec::new(), &self.settings);
        let outcome = PublishOutcome::from(self.gateway.send_presence(&payload).await);
        if outcome == PublishOutcome::Sent {
            info!("Presence cleared");
        }
        Ok(outcome)
    }

    fn ensure_running(&self) -> Result<()> {
        if self.gateway.is_shut_down() {
            return Err(GatewayError::NotConnected.into());
        }
        Ok(())
    }

    /// Best-effort clear, then close the gateway for good.
    pub async fn shutdown(&self) {
        let cleared = self.clear().await;
        debug!(outcome = ?cleared, "Final presence clear");
        self.gateway.shutdown().await;
    }
}
