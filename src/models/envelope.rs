use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value as JsonValue};
use std::fmt;

use super::notification::Notification;

/// Discriminator of a message envelope.
///
/// `NOTIFICATION` is the only application frame; the remaining known kinds
/// are system frames — either consumed by the connection manager (`PONG`) or
/// synthesized locally (`SYSTEM_*`, `PARSE_ERROR`). Unrecognized type strings
/// round-trip through [`MessageType::Unknown`] so newer server frames are
/// observable instead of lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageType {
    Notification,
    Ping,
    Pong,
    SystemConnected,
    SystemDisconnected,
    SystemError,
    ParseError,
    Unknown(String),
}

impl MessageType {
    /// Wire form of the type tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Notification => "NOTIFICATION",
            Self::Ping => "PING",
            Self::Pong => "PONG",
            Self::SystemConnected => "SYSTEM_CONNECTED",
            Self::SystemDisconnected => "SYSTEM_DISCONNECTED",
            Self::SystemError => "SYSTEM_ERROR",
            Self::ParseError => "PARSE_ERROR",
            Self::Unknown(other) => other,
        }
    }

    /// Whether this is a system frame (as opposed to an application frame).
    pub fn is_system(&self) -> bool {
        !matches!(self, Self::Notification | Self::Unknown(_))
    }
}

impl From<&str> for MessageType {
    fn from(value: &str) -> Self {
        match value {
            "NOTIFICATION" => Self::Notification,
            "PING" => Self::Ping,
            "PONG" => Self::Pong,
            "SYSTEM_CONNECTED" => Self::SystemConnected,
            "SYSTEM_DISCONNECTED" => Self::SystemDisconnected,
            "SYSTEM_ERROR" => Self::SystemError,
            "PARSE_ERROR" => Self::ParseError,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Payload carried by a frame that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseErrorData {
    /// The raw payload exactly as it arrived.
    pub raw_data: String,
}

/// Typed payload of a [`MessageEnvelope`].
///
/// Classified from the envelope's type tag on receipt. Payloads that do not
/// match the expected shape for their tag — and payloads of unknown or
/// system frames — are kept verbatim in [`EnvelopeData::Raw`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeData {
    Notification(Notification),
    ParseError(ParseErrorData),
    Raw(JsonValue),
}

impl Default for EnvelopeData {
    fn default() -> Self {
        Self::Raw(JsonValue::Null)
    }
}

impl EnvelopeData {
    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Self::Notification(notification) => Some(notification),
            _ => None,
        }
    }

    pub fn as_parse_error(&self) -> Option<&ParseErrorData> {
        match self {
            Self::ParseError(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&JsonValue> {
        match self {
            Self::Raw(value) => Some(value),
            _ => None,
        }
    }
}

/// One discrete message unit exchanged over the real-time channel.
///
/// Wire shape: `{"type": string, "data": any, "timestamp"?: ISO-8601,
/// "id"?: string}`. Envelopes are immutable once constructed; `timestamp`
/// and `id` are assigned by the sender when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageEnvelope {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub data: EnvelopeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Raw wire shape, before payload classification.
#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(rename = "type")]
    message_type: MessageType,
    #[serde(default)]
    data: JsonValue,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    id: Option<String>,
}

impl<'de> Deserialize<'de> for MessageEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireEnvelope::deserialize(deserializer)?;
        Ok(Self::from_wire(wire))
    }
}

impl MessageEnvelope {
    /// Build an envelope with no timestamp or id; the sender stamps both.
    pub fn new(message_type: MessageType, data: EnvelopeData) -> Self {
        Self {
            message_type,
            data,
            timestamp: None,
            id: None,
        }
    }

    /// An application frame carrying a notification.
    pub fn notification(notification: Notification) -> Self {
        Self::new(
            MessageType::Notification,
            EnvelopeData::Notification(notification),
        )
    }

    /// A keep-alive ping frame.
    pub fn ping() -> Self {
        Self::new(MessageType::Ping, EnvelopeData::default())
    }

    /// A keep-alive pong frame.
    pub fn pong() -> Self {
        Self::new(MessageType::Pong, EnvelopeData::default())
    }

    /// A locally synthesized system frame carrying a human-readable message.
    pub fn system(message_type: MessageType, message: impl Into<String>) -> Self {
        Self::new(
            message_type,
            EnvelopeData::Raw(json!({ "message": message.into() })),
        )
    }

    /// The envelope a malformed frame is converted into, carrying the raw
    /// payload so consumers can observe and diagnose it.
    pub fn parse_error(raw: &str) -> Self {
        Self::new(
            MessageType::ParseError,
            EnvelopeData::ParseError(ParseErrorData {
                raw_data: raw.to_string(),
            }),
        )
    }

    /// Parse a raw frame. Never fails: payloads that are not valid envelope
    /// JSON come back as a single `PARSE_ERROR` envelope instead.
    pub fn parse(raw: &str) -> Self {
        match serde_json::from_str::<MessageEnvelope>(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("[thesia-link] Failed to parse frame: {}", e);
                Self::parse_error(raw)
            }
        }
    }

    fn from_wire(wire: WireEnvelope) -> Self {
        let data = match &wire.message_type {
            MessageType::Notification => {
                match serde_json::from_value::<Notification>(wire.data.clone()) {
                    Ok(notification) => EnvelopeData::Notification(notification),
                    Err(e) => {
                        log::warn!(
                            "[thesia-link] NOTIFICATION frame with unexpected payload shape: {}",
                            e
                        );
                        EnvelopeData::Raw(wire.data)
                    }
                }
            }
            MessageType::ParseError => {
                match serde_json::from_value::<ParseErrorData>(wire.data.clone()) {
                    Ok(parse_error) => EnvelopeData::ParseError(parse_error),
                    Err(_) => EnvelopeData::Raw(wire.data),
                }
            }
            _ => EnvelopeData::Raw(wire.data),
        };

        Self {
            message_type: wire.message_type,
            data,
            timestamp: wire.timestamp,
            id: wire.id,
        }
    }
}
