//! Wire protocol types for the POS ↔ relay WebSocket channel
//!
//! Relay → POS: Barcode, ScannerStatus, Connection, Heartbeat, Error, ServerShutdown
//! POS → Relay: Ping, ConnectionConfirmed, HeartbeatResponse

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod notice;
pub use notice::*;

/// Mobile scanner presence, as reported by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerStatus {
    Connected,
    Disconnected,
}

impl fmt::Display for ScannerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Event pushed by the relay over the channel.
///
/// Dispatched on the `"type"` field. Well-formed frames with an
/// unrecognized `type` decode to [`InboundEvent::Unknown`] and are
/// dropped without raising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A scan captured by the paired mobile device
    Barcode { code: String },

    /// Mobile scanner presence changed
    ScannerStatus { status: ScannerStatus },

    /// Relay acknowledged the register's connection.
    /// Only `status == "connected"` is specified; anything else is ignored.
    Connection { status: String },

    /// Liveness probe, answered with a `heartbeat_response`
    Heartbeat,

    /// Application-level relay fault, non-fatal
    Error { message: String },

    /// Relay is going down; the channel's own reconnect handles recovery
    ServerShutdown,

    /// Unrecognized `type` value
    #[serde(other)]
    Unknown,
}

/// Message sent by the register over the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Application keep-alive, sent periodically while the channel is open
    Ping { timestamp: String },

    /// Acknowledgement of the relay's `connection` event
    #[serde(rename_all = "camelCase")]
    ConnectionConfirmed {
        session_id: String,
        device_info: DeviceInfo,
        timestamp: String,
    },

    /// Reply to a `heartbeat` probe
    HeartbeatResponse { timestamp: String },
}

impl OutboundMessage {
    /// Create a keep-alive ping stamped with the current time.
    pub fn ping() -> Self {
        Self::Ping {
            timestamp: crate::util::iso_now(),
        }
    }

    /// Create a connection acknowledgement for `session_id`.
    pub fn connection_confirmed(session_id: impl Into<String>) -> Self {
        Self::ConnectionConfirmed {
            session_id: session_id.into(),
            device_info: DeviceInfo::pos(),
            timestamp: crate::util::iso_now(),
        }
    }

    /// Create a heartbeat reply stamped with the current time.
    pub fn heartbeat_response() -> Self {
        Self::HeartbeatResponse {
            timestamp: crate::util::iso_now(),
        }
    }

    /// Serialize for transmission as a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Basic device metadata carried in `connection_confirmed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub user_agent: String,
    pub platform: String,
    #[serde(rename = "type")]
    pub device_type: String,
}

impl DeviceInfo {
    /// Metadata identifying this register to the relay.
    pub fn pos() -> Self {
        Self {
            user_agent: format!("scanner-link/{}", env!("CARGO_PKG_VERSION")),
            platform: std::env::consts::OS.to_string(),
            device_type: "pos".to_string(),
        }
    }
}
