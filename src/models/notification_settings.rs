use serde::{Deserialize, Serialize};

/// Per-user notification delivery preferences
/// (`GET /notifications/settings`, `PUT /notifications/settings`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Mirror notifications to the user's email address.
    pub email_enabled: bool,
    /// Deliver notifications over the real-time channel.
    pub push_enabled: bool,
    /// Generate deadline reminder notifications (defense requests,
    /// re-inscription windows).
    pub reminders_enabled: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_enabled: true,
            push_enabled: true,
            reminders_enabled: true,
        }
    }
}
