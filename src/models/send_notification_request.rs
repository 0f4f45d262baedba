use serde::{Deserialize, Serialize};

use super::notification::NotificationKind;

/// Body of the admin send endpoint (`POST /notifications`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    /// Backend identifier of the recipient user.
    pub recipient_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
}

impl SendNotificationRequest {
    pub fn new(
        recipient_id: i64,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            recipient_id,
            title: title.into(),
            message: message.into(),
            kind,
        }
    }
}
