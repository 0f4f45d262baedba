//! Notification store behavior tests.
//!
//! The backend here is a deliberately unreachable address (an ephemeral port
//! that was bound and released), which makes the optimistic-update contract
//! observable: local mutations apply and stay applied even though every
//! backend call fails.

use chrono::Utc;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use thesia_link::{
    EnvelopeData, MessageEnvelope, MessageType, Notification, NotificationKind,
    NotificationSettings, NotificationStore, RecipientRef, SendNotificationRequest,
    ThesiaLinkClient,
};

async fn unreachable_client() -> ThesiaLinkClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    ThesiaLinkClient::builder()
        .base_url(format!("http://{}", addr))
        .max_retries(0)
        .build()
        .unwrap()
}

fn notification(id: i64, read: bool) -> Notification {
    Notification {
        id,
        recipient_ref: RecipientRef {
            id: 7,
            username: None,
        },
        title: format!("Notification {}", id),
        message: "Inscription dossier update".to_string(),
        kind: NotificationKind::Info,
        created_at: Utc::now(),
        read_at: read.then(Utc::now),
        read,
    }
}

#[tokio::test]
async fn test_push_increments_unread_and_prepends() {
    let store = NotificationStore::new(unreachable_client().await);

    store.on_push_notification(notification(1, true));
    let before = store.current_unread_count();

    store.on_push_notification(notification(2, false));

    assert_eq!(store.current_unread_count(), before + 1);
    assert_eq!(store.current_list()[0].id, 2);
    assert_eq!(store.current_list().len(), 2);
}

#[tokio::test]
async fn test_mark_read_is_optimistic_and_not_rolled_back() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));
    assert_eq!(store.current_unread_count(), 1);

    // The backend is unreachable, so the call fails...
    let result = store.mark_read(1).await;
    assert!(result.is_err());

    // ...but the optimistic local change stays applied.
    let entry = store
        .current_list()
        .into_iter()
        .find(|n| n.id == 1)
        .expect("entry present");
    assert!(entry.read);
    assert!(entry.read_at.is_some());
    assert_eq!(store.current_unread_count(), 0);
}

#[tokio::test]
async fn test_mark_read_unknown_id_keeps_list_intact() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));

    let result = store.mark_read(999).await;
    assert!(result.is_err());

    assert_eq!(store.current_unread_count(), 1);
    assert!(!store.current_list()[0].read);
}

#[tokio::test]
async fn test_mark_all_read_clears_unread() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));
    store.on_push_notification(notification(2, false));
    store.on_push_notification(notification(3, true));
    assert_eq!(store.current_unread_count(), 2);

    let result = store.mark_all_read().await;
    assert!(result.is_err());

    assert_eq!(store.current_unread_count(), 0);
    assert!(store.current_list().iter().all(|n| n.read && n.read_at.is_some()));
}

#[tokio::test]
async fn test_remove_is_optimistic() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));
    store.on_push_notification(notification(2, false));

    let result = store.remove(2).await;
    assert!(result.is_err());

    assert_eq!(store.current_list().len(), 1);
    assert_eq!(store.current_list()[0].id, 1);
    assert_eq!(store.current_unread_count(), 1);
}

#[tokio::test]
async fn test_fetch_mine_failure_preserves_prior_list() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));

    let result = store.fetch_mine().await;
    assert!(result.is_err());

    assert_eq!(store.current_list().len(), 1);
    assert_eq!(store.current_unread_count(), 1);
}

#[tokio::test]
async fn test_attach_pumps_notification_frames_only() {
    let store = NotificationStore::new(unreachable_client().await);
    let (tx, rx) = mpsc::channel::<MessageEnvelope>(8);
    let pump = store.attach(rx);

    // Non-notification frames are ignored by the pump.
    tx.send(MessageEnvelope::system(MessageType::SystemConnected, "up"))
        .await
        .unwrap();
    tx.send(MessageEnvelope::new(
        MessageType::from("DEFENSE_SCHEDULED"),
        EnvelopeData::Raw(json!({"room": "B12"})),
    ))
    .await
    .unwrap();
    tx.send(MessageEnvelope::notification(notification(5, false)))
        .await
        .unwrap();

    // Closing the stream lets the pump drain and stop.
    drop(tx);
    pump.await.unwrap();

    assert_eq!(store.current_list().len(), 1);
    assert_eq!(store.current_list()[0].id, 5);
    assert_eq!(store.current_unread_count(), 1);
}

#[tokio::test]
async fn test_settings_and_admin_send_surface_backend_errors() {
    let client = unreachable_client().await;

    assert!(client.notification_settings().await.is_err());
    assert!(client
        .update_notification_settings(&NotificationSettings::default())
        .await
        .is_err());
    assert!(client
        .send_notification(&SendNotificationRequest::new(
            7,
            "Defense scheduled",
            "Room B12, 14:00",
            NotificationKind::Info,
        ))
        .await
        .is_err());
}

#[tokio::test]
async fn test_unread_is_recomputed_never_negative() {
    let store = NotificationStore::new(unreachable_client().await);
    store.on_push_notification(notification(1, false));

    // Marking the same entry twice cannot drive the counter below zero:
    // it is recomputed from the list, not decremented.
    let _ = store.mark_read(1).await;
    let _ = store.mark_read(1).await;

    assert_eq!(store.current_unread_count(), 0);
}
