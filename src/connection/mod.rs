//! Real-time connection management.
//!
//! This module contains:
//! - [`manager`]: Connection manager owning the WebSocket transport
//!   (connect/disconnect, heartbeat, bounded exponential-backoff reconnection)
//! - [`websocket`]: Low-level WebSocket helpers (URL resolution, token query
//!   parameters, handshake request construction)

pub mod manager;
pub(crate) mod websocket;

pub use manager::{ConnectionManager, ConnectionStreams};

/// Capacity of the forwarded-message channel.
pub(crate) const DEFAULT_MESSAGE_CHANNEL_CAPACITY: usize = 1024;

/// Capacity of the state-transition channel.
pub(crate) const DEFAULT_STATE_CHANNEL_CAPACITY: usize = 64;

/// Capacity of the low-level error channel.
pub(crate) const DEFAULT_ERROR_CHANNEL_CAPACITY: usize = 64;

/// Upper bound on the exponential reconnect backoff.
pub(crate) const MAX_RECONNECT_DELAY_MS: u64 = 30_000;

/// Close code reserved for a deliberate disconnect; any other close code
/// triggers the reconnection algorithm.
pub(crate) const NORMAL_CLOSE_CODE: u16 = 1000;

/// A duration far enough in the future (~100 years) to act as "never" for
/// deadline calculations without overflowing `Instant::now() + dur`.
pub(crate) const FAR_FUTURE: std::time::Duration =
    std::time::Duration::from_secs(100 * 365 * 24 * 3600);
