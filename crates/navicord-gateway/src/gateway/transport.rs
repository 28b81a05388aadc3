//! Gateway discovery and socket establishment.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, Stream, StreamExt};
use navicord_common::GatewayError;
use navicord_config::schema::GatewayConfig;
use serde::Deserialize;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tracing::debug;

/// Write half of a gateway socket.
pub type FrameSink = Pin<Box<dyn Sink<Message, Error = WsError> + Send>>;

/// Read half of a gateway socket.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Message, WsError>> + Send>>;

/// Opens gateway sockets. The state machine calls it once per session.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Resolve the socket URL to connect to.
    async fn discover(&self) -> Result<String, GatewayError>;

    /// Complete the transport-level handshake with `url`.
    async fn open(&self, url: &str) -> Result<(FrameSink, FrameStream), GatewayError>;
}

/// Append the encoding and version query unless the URL already names a version.
pub fn gateway_url(base: &str, api_version: u32) -> String {
    let query = base.split_once('?').map(|(_, q)| q).unwrap_or("");
    if query.split('&').any(|pair| pair.starts_with("v=")) {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}encoding=json&v={api_version}")
}

#[derive(Deserialize)]
struct DiscoveryResponse {
    url: String,
}

// ---------------------------------------------------------------------------
// WebSocket connector
// ---------------------------------------------------------------------------

/// Production connector: REST discovery plus a TLS WebSocket.
pub struct WsConnector {
    http: reqwest::Client,
    discovery_url: String,
    api_version: u32,
    connect_timeout: Duration,
}

impl WsConnector {
    pub fn new(config: &GatewayConfig) -> Self {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            discovery_url: config.discovery_url(),
            api_version: config.api_version,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn discover(&self) -> Result<String, GatewayError> {
        let response = self
            .http
            .get(&self.discovery_url)
            .send()
            .await
            .map_err(|e| GatewayError::Discovery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Discovery(format!("HTTP {status}")));
        }

        let body: DiscoveryResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Discovery(format!("malformed response: {e}")))?;

        let url = gateway_url(&body.url, self.api_version);
        debug!(url = %url, "Discovered gateway endpoint");
        Ok(url)
    }

    async fn open(&self, url: &str) -> Result<(FrameSink, FrameStream), GatewayError> {
        let (ws_stream, _) =
            tokio::time::timeout(self.connect_timeout, tokio_tungstenite::connect_async(url))
                .await
                .map_err(|_| {
                    GatewayError::Transport(format!(
                        "connect timed out after {}s",
                        self.connect_timeout.as_secs()
                    ))
                })?
                .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let (write, read) = ws_stream.split();
        Ok((Box::pin(write), Box::pin(read)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_query_when_absent() {
        assert_eq!(
            gateway_url("wss://gateway.discord.gg", 10),
            "wss://gateway.discord.gg?encoding=json&v=10"
        );
        assert_eq!(
            gateway_url("wss://gateway.discord.gg/?compress=none", 9),
            "wss://gateway.discord.gg/?compress=none&encoding=json&v=9"
        );
    }

    #[test]
    fn keeps_existing_version_query() {
        let url = "wss://gateway.discord.gg/?v=10&encoding=json";
        assert_eq!(gateway_url(url, 9), url);
    }

    #[test]
    fn connector_uses_configured_discovery_endpoint() {
        let connector = WsConnector::new(&GatewayConfig {
            api_base: "http://127.0.0.1:9/api".into(),
            ..Default::default()
        });
        assert_eq!(connector.discovery_url, "http://127.0.0.1:9/api/gateway");
        assert_eq!(connector.api_version, 10);
        assert_eq!(connector.connect_timeout, Duration::from_secs(15));
    }
}
