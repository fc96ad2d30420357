//! WebSocket message DTOs for the relay.
//!
//! Every text frame carries one named event:
//! `{"event": "...", "data": ..., "ackId": 1}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event names owned by the relay itself
pub mod event {
    pub const JOIN_SESSION: &str = "join-session";
    pub const CLIENT_JOINED: &str = "client-joined";
    pub const CLIENT_LEFT: &str = "client-left";
    pub const PING: &str = "ping";
    pub const PONG: &str = "pong";
}

/// Frame received from a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
}

/// Frame sent to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEnvelope<T> {
    pub event: String,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<u64>,
}

impl<T: Serialize> OutboundEnvelope<T> {
    /// Envelope for a broadcast event
    pub fn new(event: impl Into<String>, data: T) -> Self {
        Self {
            event: event.into(),
            data,
            ack_id: None,
        }
    }

    /// Envelope answering a request that carried `ack_id`
    pub fn reply(event: impl Into<String>, data: T, ack_id: Option<u64>) -> Self {
        Self {
            event: event.into(),
            data,
            ack_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Presence notification (`client-joined` / `client-left`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    /// Server-assigned connection id
    pub client_id: String,
    pub session_id: String,
    /// RFC 3339 UTC
    pub timestamp: String,
}

/// Reply to `ping`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongPayload {
    /// RFC 3339 UTC
    pub timestamp: String,
    pub server_id: String,
}
