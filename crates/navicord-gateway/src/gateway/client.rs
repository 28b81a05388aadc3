//! Public handle for the gateway connection.

use std::sync::{Arc, Mutex};

use navicord_config::schema::{BackoffConfig, GatewayConfig};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::connection::run_driver;
use super::protocol::{GatewayFrame, PresencePayload};
use super::shared::{SendGate, Shared};
use super::state::ConnectionState;
use super::transport::{Connector, WsConnector};
use super::types::{GatewayEvent, SendOutcome};

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Handle for the gateway connection.
///
/// Cloning is cheap; every clone drives the same background connection.
/// Nothing connects until [`GatewayClient::start`] is called.
#[derive(Clone)]
pub struct GatewayClient {
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    backoff: BackoffConfig,
    driver: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl GatewayClient {
    /// Client using REST discovery and a TLS WebSocket.
    pub fn new(config: GatewayConfig, backoff: BackoffConfig) -> Self {
        let connector = Arc::new(WsConnector::new(&config));
        Self::with_connector(config, backoff, connector)
    }

    pub fn with_connector(
        config: GatewayConfig,
        backoff: BackoffConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(config)),
            connector,
            backoff,
            driver: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the background driver. Calling it again is a no-op.
    pub fn start(&self) {
        let mut driver = self.driver.lock().unwrap_or_else(|e| e.into_inner());
        if driver.is_some() {
            return;
        }
        info!("Starting gateway driver");
        *driver = Some(tokio::spawn(run_driver(
            Arc::clone(&self.shared),
            Arc::clone(&self.connector),
            self.backoff.clone(),
        )));
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Whether [`GatewayClient::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.is_cancelled()
    }

    /// Observe lifecycle events. Slow receivers miss old events rather than
    /// blocking the driver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.shared.subscribe()
    }

    /// Send a Presence Update on the current session if it is Ready.
    pub async fn send_presence(&self, payload: &PresencePayload) -> SendOutcome {
        let frame = match GatewayFrame::presence(payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Dropping presence update");
                return SendOutcome::Failed;
            }
        };
        self.shared.send(&frame, SendGate::Ready).await
    }

    /// Close the connection and stop reconnecting. Resolves once the driver
    /// has exited. The client cannot be restarted afterwards.
    pub async fn shutdown(&self) {
        self.shared.shutdown.cancel();
        let handle = self
            .driver
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Gateway driver ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("state", &self.state())
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}
