//! Gateway wire format: JSON frames with an integer opcode and a payload.
//!
//! Only the presence subset of the protocol is modelled. Everything else
//! the server sends classifies as [`Inbound::Unknown`] and is ignored.

use navicord_common::GatewayError;
use navicord_config::schema::IdentifyProperties;
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::Message;

/// Opcodes used by the presence subset of the protocol.
pub mod opcodes {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const PRESENCE_UPDATE: u8 = 3;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Dispatch event tag that completes the handshake.
pub const READY_EVENT: &str = "READY";

// ---------------------------------------------------------------------------
// Frame envelope
// ---------------------------------------------------------------------------

/// A single gateway frame in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayFrame {
    pub fn new(op: u8, d: serde_json::Value) -> Self {
        Self {
            op,
            d,
            s: None,
            t: None,
        }
    }

    /// Keep-alive carrying the last sequence number seen, or null.
    pub fn heartbeat(sequence: Option<u64>) -> Self {
        Self::new(opcodes::HEARTBEAT, serde_json::json!(sequence))
    }

    /// Authenticate the session. No event subscriptions are requested.
    pub fn identify(token: &str, properties: &IdentifyProperties) -> Self {
        Self::new(
            opcodes::IDENTIFY,
            serde_json::json!({
                "token": token,
                "intents": 0,
                "properties": {
                    "os": properties.os,
                    "browser": properties.browser,
                    "device": properties.device,
                }
            }),
        )
    }

    pub fn presence(payload: &PresencePayload) -> Result<Self, GatewayError> {
        let d = serde_json::to_value(payload)
            .map_err(|e| GatewayError::Protocol(format!("unserializable presence: {e}")))?;
        Ok(Self::new(opcodes::PRESENCE_UPDATE, d))
    }

    pub fn to_message(&self) -> Result<Message, GatewayError> {
        let json = serde_json::to_string(self)
            .map_err(|e| GatewayError::Protocol(format!("unserializable frame: {e}")))?;
        Ok(Message::Text(json.into()))
    }

    pub fn parse(text: &str) -> Result<Self, GatewayError> {
        serde_json::from_str(text).map_err(|e| GatewayError::Protocol(e.to_string()))
    }

    /// Interpret an inbound frame.
    pub fn classify(&self) -> Result<Inbound, GatewayError> {
        let inbound = match self.op {
            opcodes::HELLO => {
                let interval = self
                    .d
                    .get("heartbeat_interval")
                    .and_then(|v| v.as_u64())
                    .filter(|ms| *ms > 0)
                    .ok_or_else(|| {
                        GatewayError::Protocol("Hello without a heartbeat_interval".into())
                    })?;
                Inbound::Hello {
                    heartbeat_interval_ms: interval,
                }
            }
            opcodes::HEARTBEAT_ACK => Inbound::HeartbeatAck,
            opcodes::HEARTBEAT => Inbound::HeartbeatRequest,
            opcodes::DISPATCH => Inbound::Dispatch {
                event: self.t.clone(),
            },
            opcodes::RECONNECT => Inbound::Reconnect,
            opcodes::INVALID_SESSION => Inbound::InvalidSession,
            other => Inbound::Unknown(other),
        };
        Ok(inbound)
    }
}

/// Inbound frames the state machine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Hello { heartbeat_interval_ms: u64 },
    HeartbeatAck,
    /// The server asks for an immediate heartbeat.
    HeartbeatRequest,
    Dispatch { event: Option<String> },
    Reconnect,
    InvalidSession,
    Unknown(u8),
}

// ---------------------------------------------------------------------------
// Presence payload
// ---------------------------------------------------------------------------

/// Body of a Presence Update frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresencePayload {
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    pub status: String,
    pub afk: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub details: String,
    pub state: String,
    pub timestamps: ActivityTimestamps,
    pub assets: ActivityAssets,
}

/// Epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTimestamps {
    pub start: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityAssets {
    pub large_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heartbeat_carries_sequence_or_null() {
        let json = serde_json::to_value(GatewayFrame::heartbeat(None)).unwrap();
        assert_eq!(json, serde_json::json!({"op": 1, "d": null}));

        let json = serde_json::to_value(GatewayFrame::heartbeat(Some(42))).unwrap();
        assert_eq!(json, serde_json::json!({"op": 1, "d": 42}));
    }

    #[test]
    fn identify_requests_no_intents() {
        let frame = GatewayFrame::identify("tok", &IdentifyProperties::default());
        assert_eq!(frame.op, opcodes::IDENTIFY);
        assert_eq!(frame.d["token"], "tok");
        assert_eq!(frame.d["intents"], 0);
        assert_eq!(frame.d["properties"]["os"], "Windows 10");
        assert_eq!(frame.d["properties"]["browser"], "Discord Client");
    }

    #[test]
    fn classifies_hello() {
        let frame = GatewayFrame::parse(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
        assert_eq!(
            frame.classify().unwrap(),
            Inbound::Hello {
                heartbeat_interval_ms: 41250
            }
        );
    }

    #[test]
    fn hello_without_interval_is_a_protocol_error() {
        let frame = GatewayFrame::parse(r#"{"op":10,"d":{}}"#).unwrap();
        assert!(matches!(frame.classify(), Err(GatewayError::Protocol(_))));
    }

    #[test]
    fn classifies_ready_dispatch_with_sequence() {
        let frame =
            GatewayFrame::parse(r#"{"op":0,"t":"READY","s":1,"d":{"session_id":"abc"}}"#).unwrap();
        assert_eq!(frame.s, Some(1));
        assert_eq!(
            frame.classify().unwrap(),
            Inbound::Dispatch {
                event: Some(READY_EVENT.to_string())
            }
        );
    }

    #[test]
    fn unknown_opcodes_are_not_errors() {
        let frame = GatewayFrame::parse(r#"{"op":42,"d":null}"#).unwrap();
        assert_eq!(frame.classify().unwrap(), Inbound::Unknown(42));

        let frame = GatewayFrame::parse(r#"{"op":11}"#).unwrap();
        assert_eq!(frame.classify().unwrap(), Inbound::HeartbeatAck);
    }

    #[test]
    fn malformed_text_fails_to_parse() {
        assert!(GatewayFrame::parse("not json").is_err());
        assert!(GatewayFrame::parse(r#"{"d":{}}"#).is_err());
    }

    #[test]
    fn presence_frame_omits_missing_end_and_album() {
        let payload = PresencePayload {
            since: None,
            activities: vec![Activity {
                application_id: "1".into(),
                kind: 2,
                name: "Band B".into(),
                details: "Song A".into(),
                state: "Band B".into(),
                timestamps: ActivityTimestamps {
                    start: 1_000_000,
                    end: None,
                },
                assets: ActivityAssets {
                    large_image: "mp:x".into(),
                    large_text: None,
                },
            }],
            status: "online".into(),
            afk: false,
        };
        let frame = GatewayFrame::presence(&payload).unwrap();
        let activity = &frame.d["activities"][0];
        assert_eq!(frame.op, opcodes::PRESENCE_UPDATE);
        assert_eq!(activity["type"], 2);
        assert!(activity["timestamps"].get("end").is_none());
        assert!(activity["assets"].get("large_text").is_none());
        assert!(frame.d["since"].is_null());
    }
}
