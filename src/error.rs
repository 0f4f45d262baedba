//! Error types for the thesia-link client.

use thiserror::Error;

/// Errors produced by thesia-link operations.
#[derive(Error, Debug)]
pub enum ThesiaLinkError {
    /// WebSocket transport failure (handshake, send, protocol violation).
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    /// Invalid client configuration (missing base URL, malformed connect URL).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The server rejected the supplied credentials.
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// An operation did not complete within its deadline.
    #[error("Timeout: {0}")]
    TimeoutError(String),

    /// The server answered with a non-success HTTP status.
    #[error("Server error ({status_code}): {message}")]
    ServerError {
        /// HTTP status code returned by the server.
        status_code: u16,
        /// Message extracted from the response body, if any.
        message: String,
    },

    /// JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Underlying HTTP client failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invariant violation inside the client itself.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ThesiaLinkError>;
