//! Data models for the thesia-link client library.
//!
//! Defines the wire message envelope, notification structures and
//! connection configuration.

pub mod connect_options;
pub mod connection_state;
pub mod envelope;
pub mod notification;
pub mod notification_settings;
pub mod send_notification_request;

#[cfg(test)]
mod tests;

pub use connect_options::ConnectOptions;
pub use connection_state::ConnectionState;
pub use envelope::{EnvelopeData, MessageEnvelope, MessageType, ParseErrorData};
pub use notification::{Notification, NotificationKind, RecipientRef};
pub use notification_settings::NotificationSettings;
pub use send_notification_request::SendNotificationRequest;
