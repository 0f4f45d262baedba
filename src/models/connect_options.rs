use serde::{Deserialize, Serialize};

/// Options for establishing the real-time connection.
///
/// Separate from the HTTP client configuration: these options control the
/// WebSocket transport only — reconnection timing, retry limits and the
/// application-level heartbeat.
///
/// # Example
///
/// ```rust
/// use thesia_link::ConnectOptions;
///
/// let options = ConnectOptions::new("ws://localhost:8080/ws")
///     .with_reconnect_interval_ms(1000)
///     .with_max_reconnect_attempts(10)
///     .with_heartbeat(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Full WebSocket URL (`ws://` or `wss://`). An empty URL fails fast
    /// into the `Error` state without any network I/O.
    #[serde(default)]
    pub url: String,

    /// WebSocket subprotocols offered during the handshake
    /// (`Sec-WebSocket-Protocol`). Empty by default.
    #[serde(default)]
    pub protocols: Vec<String>,

    /// Base delay in milliseconds between reconnection attempts.
    /// Default: 3000ms. Grows exponentially, capped at 30s.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Maximum number of reconnection attempts before the connection settles
    /// into the `Error` state. Default: 5.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Whether to send a recurring application-level `PING` envelope while
    /// connected. Default: true.
    #[serde(default = "default_heartbeat")]
    pub heartbeat: bool,

    /// Interval between heartbeat pings in milliseconds. Default: 30000ms.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Timeout for the transport handshake in milliseconds.
    /// Set to 0 to wait indefinitely. Default: 10000ms.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_reconnect_interval_ms() -> u64 {
    3000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_heartbeat() -> bool {
    true
}

fn default_heartbeat_interval_ms() -> u64 {
    30000
}

fn default_connect_timeout_ms() -> u64 {
    10000
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            protocols: Vec::new(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            heartbeat: default_heartbeat(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl ConnectOptions {
    /// Create options for the given WebSocket URL with defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the WebSocket subprotocols offered during the handshake.
    pub fn with_protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = protocols;
        self
    }

    /// Set the base delay between reconnection attempts (in milliseconds).
    pub fn with_reconnect_interval_ms(mut self, delay_ms: u64) -> Self {
        self.reconnect_interval_ms = delay_ms;
        self
    }

    /// Set the maximum number of reconnection attempts.
    pub fn with_max_reconnect_attempts(mut self, max_attempts: u32) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self
    }

    /// Enable or disable the application-level heartbeat.
    pub fn with_heartbeat(mut self, enabled: bool) -> Self {
        self.heartbeat = enabled;
        self
    }

    /// Set the heartbeat ping interval (in milliseconds).
    pub fn with_heartbeat_interval_ms(mut self, interval_ms: u64) -> Self {
        self.heartbeat_interval_ms = interval_ms;
        self
    }

    /// Set the transport handshake timeout (in milliseconds).
    /// Pass 0 to wait indefinitely.
    pub fn with_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }
}
