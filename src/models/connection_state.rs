use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the real-time connection.
///
/// Exactly one value is held at any time. Transitions are published on the
/// connection state stream in the order they are decided, so subscribers
/// observe a strictly ordered state history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// A transport handshake is in flight.
    Connecting,
    /// The transport is open; frames flow.
    Connected,
    /// No transport is open and none is pending. Initial state, and the
    /// result of a deliberate `disconnect()`.
    Disconnected,
    /// An unexpected close occurred; a backoff timer is pending.
    Reconnecting,
    /// A failure occurred. Terminal once the reconnection attempt budget is
    /// exhausted, until a fresh `connect()` call.
    Error,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

impl ConnectionState {
    /// Wire/display form of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Disconnected => "DISCONNECTED",
            Self::Reconnecting => "RECONNECTING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
