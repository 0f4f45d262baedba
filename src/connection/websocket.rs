//! Low-level WebSocket helpers: URL resolution, authenticated connect URLs,
//! client request construction.

use tokio_tungstenite::tungstenite::{
    client::IntoClientRequest,
    http::{header::SEC_WEBSOCKET_PROTOCOL, HeaderValue, Request},
};

use crate::error::{Result, ThesiaLinkError};

/// The WebSocket stream type used by the connection manager.
pub(crate) type WebSocketStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Turn a base URL into a WebSocket URL.
///
/// `http`/`https` schemes are swapped for `ws`/`wss`; URLs already carrying
/// a WebSocket scheme pass through untouched (minus a trailing slash).
pub(crate) fn resolve_ws_url(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.starts_with("ws://") || normalized.starts_with("wss://") {
        return normalized.to_string();
    }
    normalized
        .replace("http://", "ws://")
        .replace("https://", "wss://")
}

/// Append the bearer token as a url-encoded `token` query parameter — the
/// only authentication mechanism for the real-time channel.
pub(crate) fn with_token(ws_url: &str, token: &str) -> Result<String> {
    let url = reqwest::Url::parse_with_params(ws_url, &[("token", token)]).map_err(|e| {
        ThesiaLinkError::ConfigurationError(format!("Invalid WebSocket URL '{}': {}", ws_url, e))
    })?;
    Ok(url.to_string())
}

/// Build the client handshake request, offering the configured subprotocols.
pub(crate) fn build_client_request(url: &str, protocols: &[String]) -> Result<Request<()>> {
    let mut request = url.into_client_request().map_err(|e| {
        ThesiaLinkError::WebSocketError(format!("Failed to build WebSocket request: {}", e))
    })?;

    if !protocols.is_empty() {
        let value = HeaderValue::from_str(&protocols.join(", ")).map_err(|e| {
            ThesiaLinkError::ConfigurationError(format!("Invalid subprotocol value: {}", e))
        })?;
        request.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
    }

    Ok(request)
}
