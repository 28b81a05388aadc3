//! Gateway connection and reconnection backoff configuration.

use serde::{Deserialize, Serialize};

/// Client properties announced in the Identify frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: "Windows 10".into(),
            browser: "Discord Client".into(),
            device: "Discord Client".into(),
        }
    }
}

/// Presence gateway connection settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// REST API base used for gateway discovery and asset uploads.
    pub api_base: String,
    /// Gateway protocol version (valid range: 6-10).
    pub api_version: u32,
    /// Long-lived user credential. Never logged.
    pub token: String,
    /// Application the activity is attributed to.
    pub application_id: String,
    /// Seconds allowed between socket open and the Ready dispatch (valid range: 5-120).
    pub handshake_timeout_secs: u64,
    /// Seconds allowed for the transport-level connect (valid range: 1-60).
    pub connect_timeout_secs: u64,
    /// Tear the session down when a heartbeat goes unacknowledged.
    pub reconnect_on_missed_ack: bool,
    pub identify: IdentifyProperties,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("token", &"[REDACTED]")
            .field("application_id", &self.application_id)
            .field("handshake_timeout_secs", &self.handshake_timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("reconnect_on_missed_ack", &self.reconnect_on_missed_ack)
            .field("identify", &self.identify)
            .finish()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api".into(),
            api_version: 10,
            token: String::new(),
            application_id: String::new(),
            handshake_timeout_secs: 30,
            connect_timeout_secs: 15,
            reconnect_on_missed_ack: true,
            identify: IdentifyProperties::default(),
        }
    }
}

impl GatewayConfig {
    /// URL of the gateway discovery endpoint.
    pub fn discovery_url(&self) -> String {
        format!("{}/gateway", self.api_base.trim_end_matches('/'))
    }

    /// URL of the external asset upload endpoint for the configured application.
    pub fn external_assets_url(&self) -> String {
        format!(
            "{}/v{}/applications/{}/external-assets",
            self.api_base.trim_end_matches('/'),
            self.api_version,
            self.application_id
        )
    }
}

/// Reconnection backoff policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first attempt and after every successful Ready.
    pub initial_secs: f64,
    /// Growth factor per failed attempt (valid range: 1.5-2.0).
    pub factor: f64,
    /// Ceiling for the delay.
    pub max_secs: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_secs: 5.0,
            factor: 2.0,
            max_secs: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let config = GatewayConfig {
            token: "super-secret".into(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn endpoint_urls() {
        let config = GatewayConfig {
            api_base: "https://discord.com/api/".into(),
            application_id: "1234".into(),
            ..Default::default()
        };
        assert_eq!(config.discovery_url(), "https://discord.com/api/gateway");
        assert_eq!(
            config.external_assets_url(),
            "https://discord.com/api/v10/applications/1234/external-assets"
        );
    }
}
