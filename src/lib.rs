//! # thesia-link: Thesia client library
//!
//! Client library for the Thesia doctoral-tracking platform's notification
//! path: the `/notifications` REST API and the real-time WebSocket channel.
//!
//! ## Features
//!
//! - **Managed connection**: single WebSocket transport with heartbeat and
//!   bounded exponential-backoff reconnection
//! - **Typed frames**: message envelopes classified into notification,
//!   system and parse-error payloads
//! - **Notification store**: newest-first merged list of pushed and fetched
//!   notifications with an always-consistent unread counter
//! - **Optimistic mutations**: mark-read and delete apply locally first,
//!   then call the backend
//! - **Bearer token auth**: one token for HTTP headers and the channel's
//!   connect URL
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use thesia_link::{
//!     ConnectionManager, EventHandlers, NotificationStore, ThesiaLinkClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ThesiaLinkClient::builder()
//!         .base_url("http://localhost:8080")
//!         .bearer_token("jwt-token")
//!         .build()?;
//!
//!     // Seed the store from the REST API.
//!     let store = NotificationStore::new(client.clone());
//!     store.fetch_mine().await?;
//!
//!     // Open the real-time channel and feed push frames into the store.
//!     let (manager, mut streams) = ConnectionManager::new(EventHandlers::new());
//!     manager
//!         .connect_with_auth(&client.websocket_url(), "jwt-token", None)
//!         .await?;
//!     let _pump = store.attach(streams.messages);
//!
//!     while let Some(state) = streams.states.recv().await {
//!         println!("connection: {} ({} unread)", state, store.current_unread_count());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod connection;
pub mod error;
pub mod event_handlers;
pub mod models;
pub mod notifications;

// Re-export main types for convenience
pub use auth::AuthProvider;
pub use client::ThesiaLinkClient;
pub use connection::{ConnectionManager, ConnectionStreams};
pub use error::{Result, ThesiaLinkError};
pub use event_handlers::{ConnectionError, DisconnectReason, EventHandlers};
pub use models::{
    ConnectOptions, ConnectionState, EnvelopeData, MessageEnvelope, MessageType, Notification,
    NotificationKind, NotificationSettings, ParseErrorData, RecipientRef, SendNotificationRequest,
};
pub use notifications::NotificationStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
