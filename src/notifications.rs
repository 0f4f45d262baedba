//! In-memory notification store.
//!
//! Merges push-delivered notifications with REST-fetched ones into a single
//! newest-first list, maintains the unread counter and pairs every local
//! mutation with the corresponding backend call.
//!
//! The list and the counter are owned exclusively by the store and mutated
//! under one write lock, so the two observed values are always consistent
//! from any subscriber's point of view. External code reads through the
//! snapshot accessors and never mutates directly.
//!
//! # Example
//!
//! ```rust,no_run
//! use thesia_link::{ConnectionManager, EventHandlers, NotificationStore, ThesiaLinkClient};
//!
//! # async fn example() -> thesia_link::Result<()> {
//! let client = ThesiaLinkClient::builder()
//!     .base_url("http://localhost:8080")
//!     .bearer_token("jwt-token")
//!     .build()?;
//!
//! let store = NotificationStore::new(client);
//! store.fetch_mine().await?;
//!
//! let (manager, streams) = ConnectionManager::new(EventHandlers::new());
//! manager
//!     .connect_with_auth("http://localhost:8080/ws", "jwt-token", None)
//!     .await?;
//! let _pump = store.attach(streams.messages);
//!
//! println!("{} unread", store.current_unread_count());
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{
    client::ThesiaLinkClient,
    error::Result,
    models::{MessageEnvelope, MessageType, Notification},
};

/// List + unread counter, mutated together under one lock.
#[derive(Debug, Default)]
struct StoreInner {
    notifications: Vec<Notification>,
    unread: usize,
}

impl StoreInner {
    /// The unread counter is always recomputed from the list, never
    /// incrementally drifted.
    fn recompute_unread(&mut self) {
        self.unread = self.notifications.iter().filter(|n| !n.read).count();
    }
}

/// Store for the current user's notifications.
///
/// Clone-able handle; clones share the same underlying list. Mutating
/// operations apply an optimistic local update first and then issue the
/// backend call — a backend failure is returned to the caller but the local
/// change is **not** rolled back (the backend stays authoritative; callers
/// that need reconciliation can [`fetch_mine`](Self::fetch_mine) again).
#[derive(Clone)]
pub struct NotificationStore {
    client: ThesiaLinkClient,
    inner: Arc<RwLock<StoreInner>>,
}

impl NotificationStore {
    /// Create an empty store backed by the given REST client.
    pub fn new(client: ThesiaLinkClient) -> Self {
        Self {
            client,
            inner: Arc::new(RwLock::new(StoreInner::default())),
        }
    }

    /// Fetch the current user's notifications and replace the in-memory
    /// list wholesale.
    ///
    /// On any network or server error the prior list is preserved and the
    /// error is returned; no retry is applied here beyond what the REST
    /// client itself does.
    pub async fn fetch_mine(&self) -> Result<Vec<Notification>> {
        let fetched = self.client.fetch_my_notifications().await?;
        log::debug!("[thesia-link] Fetched {} notification(s)", fetched.len());
        self.replace_all(fetched);
        Ok(self.current_list())
    }

    /// Mark one notification as read: optimistic local update, then
    /// `PUT /notifications/{id}/read`. No rollback on backend failure.
    pub async fn mark_read(&self, id: i64) -> Result<()> {
        let now = Utc::now();
        {
            let mut inner = self.inner.write().unwrap();
            if let Some(notification) =
                inner.notifications.iter_mut().find(|n| n.id == id)
            {
                notification.read = true;
                notification.read_at = Some(now);
            }
            inner.recompute_unread();
        }
        self.client.mark_notification_read(id).await
    }

    /// Mark every notification as read: optimistic local update, then
    /// `PUT /notifications/read-all`. No rollback on backend failure.
    pub async fn mark_all_read(&self) -> Result<()> {
        let now = Utc::now();
        {
            let mut inner = self.inner.write().unwrap();
            for notification in inner.notifications.iter_mut() {
                if !notification.read {
                    notification.read = true;
                    notification.read_at = Some(now);
                }
            }
            inner.recompute_unread();
        }
        self.client.mark_all_notifications_read().await
    }

    /// Remove one notification: optimistic local removal, then
    /// `DELETE /notifications/{id}`. No rollback on backend failure.
    pub async fn remove(&self, id: i64) -> Result<()> {
        {
            let mut inner = self.inner.write().unwrap();
            inner.notifications.retain(|n| n.id != id);
            inner.recompute_unread();
        }
        self.client.delete_notification(id).await
    }

    /// Ingest one push-delivered notification: prepended (newest-first),
    /// counter recomputed. No de-duplication against an already-present id
    /// is performed — the backend enforces uniqueness.
    pub fn on_push_notification(&self, notification: Notification) {
        let mut inner = self.inner.write().unwrap();
        inner.notifications.insert(0, notification);
        inner.recompute_unread();
    }

    /// Snapshot of the current list, for call sites that cannot subscribe.
    pub fn current_list(&self) -> Vec<Notification> {
        self.inner.read().unwrap().notifications.clone()
    }

    /// Snapshot of the current unread count.
    pub fn current_unread_count(&self) -> usize {
        self.inner.read().unwrap().unread
    }

    /// Subscribe this store to a connection manager's message stream:
    /// `NOTIFICATION` frames feed [`on_push_notification`](Self::on_push_notification),
    /// everything else is ignored. The pump ends when the stream closes.
    pub fn attach(&self, mut messages: mpsc::Receiver<MessageEnvelope>) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            while let Some(envelope) = messages.recv().await {
                if envelope.message_type != MessageType::Notification {
                    continue;
                }
                match envelope.data.as_notification() {
                    Some(notification) => store.on_push_notification(notification.clone()),
                    None => {
                        log::warn!(
                            "[thesia-link] Dropping NOTIFICATION frame without a usable payload"
                        );
                    }
                }
            }
            log::debug!("[thesia-link] Notification pump stopped: message stream closed");
        })
    }

    /// Replace the list wholesale and recompute the counter in one step.
    fn replace_all(&self, notifications: Vec<Notification>) {
        let mut inner = self.inner.write().unwrap();
        inner.notifications = notifications;
        inner.recompute_unread();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, RecipientRef};

    fn notification(id: i64, read: bool) -> Notification {
        Notification {
            id,
            recipient_ref: RecipientRef {
                id: 7,
                username: Some("doctorant".to_string()),
            },
            title: format!("Notification {}", id),
            message: "Defense request update".to_string(),
            kind: NotificationKind::Info,
            created_at: Utc::now(),
            read_at: read.then(Utc::now),
            read,
        }
    }

    fn store() -> NotificationStore {
        let client = ThesiaLinkClient::builder()
            .base_url("http://127.0.0.1:9")
            .build()
            .expect("client builds");
        NotificationStore::new(client)
    }

    #[test]
    fn test_replace_all_recomputes_unread() {
        let store = store();
        store.replace_all(vec![notification(1, false), notification(2, true)]);

        assert_eq!(store.current_list().len(), 2);
        assert_eq!(store.current_unread_count(), 1);
    }

    #[test]
    fn test_push_prepends_and_bumps_unread() {
        let store = store();
        store.replace_all(vec![notification(1, true)]);

        store.on_push_notification(notification(2, false));

        assert_eq!(store.current_unread_count(), 1);
        assert_eq!(store.current_list()[0].id, 2);
    }

    #[test]
    fn test_push_does_not_deduplicate() {
        let store = store();
        store.on_push_notification(notification(1, false));
        store.on_push_notification(notification(1, false));

        assert_eq!(store.current_list().len(), 2);
        assert_eq!(store.current_unread_count(), 2);
    }
}
