use chrono::{TimeZone, Utc};
use serde_json::json;

use super::*;

fn sample_notification() -> Notification {
    Notification {
        id: 42,
        recipient_ref: RecipientRef {
            id: 7,
            username: Some("doctorant".to_string()),
        },
        title: "Defense request".to_string(),
        message: "Your defense request was approved".to_string(),
        kind: NotificationKind::Info,
        created_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        read_at: None,
        read: false,
    }
}

// ==================== ConnectOptions Tests ====================

#[test]
fn test_connect_options_default() {
    let opts = ConnectOptions::default();

    assert!(opts.url.is_empty());
    assert!(opts.protocols.is_empty());
    assert_eq!(opts.reconnect_interval_ms, 3000, "reconnect_interval_ms should default to 3000");
    assert_eq!(opts.max_reconnect_attempts, 5, "max_reconnect_attempts should default to 5");
    assert!(opts.heartbeat, "heartbeat should default to true");
    assert_eq!(opts.heartbeat_interval_ms, 30000, "heartbeat_interval_ms should default to 30000");
}

#[test]
fn test_connect_options_builder_pattern() {
    let opts = ConnectOptions::new("ws://localhost:8080/ws")
        .with_protocols(vec!["thesia-v1".to_string()])
        .with_reconnect_interval_ms(1000)
        .with_max_reconnect_attempts(10)
        .with_heartbeat(false)
        .with_heartbeat_interval_ms(5000)
        .with_connect_timeout_ms(2000);

    assert_eq!(opts.url, "ws://localhost:8080/ws");
    assert_eq!(opts.protocols, vec!["thesia-v1".to_string()]);
    assert_eq!(opts.reconnect_interval_ms, 1000);
    assert_eq!(opts.max_reconnect_attempts, 10);
    assert!(!opts.heartbeat);
    assert_eq!(opts.heartbeat_interval_ms, 5000);
    assert_eq!(opts.connect_timeout_ms, 2000);
}

#[test]
fn test_connect_options_deserialization_with_defaults() {
    // Missing fields get proper defaults
    let json = r#"{"url": "ws://localhost:8080/ws"}"#;
    let opts: ConnectOptions = serde_json::from_str(json).unwrap();

    assert_eq!(opts.url, "ws://localhost:8080/ws");
    assert_eq!(opts.reconnect_interval_ms, 3000); // default
    assert_eq!(opts.max_reconnect_attempts, 5); // default
    assert!(opts.heartbeat); // default
}

#[test]
fn test_connect_options_serialization_round_trip() {
    let opts = ConnectOptions::new("ws://x").with_max_reconnect_attempts(2);

    let json = serde_json::to_string(&opts).unwrap();
    let parsed: ConnectOptions = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, opts);
}

// ==================== ConnectionState Tests ====================

#[test]
fn test_connection_state_wire_form() {
    assert_eq!(serde_json::to_value(ConnectionState::Connecting).unwrap(), "CONNECTING");
    assert_eq!(serde_json::to_value(ConnectionState::Reconnecting).unwrap(), "RECONNECTING");

    let parsed: ConnectionState = serde_json::from_value(json!("ERROR")).unwrap();
    assert_eq!(parsed, ConnectionState::Error);
}

#[test]
fn test_connection_state_display_and_default() {
    assert_eq!(ConnectionState::Connected.to_string(), "CONNECTED");
    assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
}

// ==================== MessageType Tests ====================

#[test]
fn test_message_type_round_trip() {
    for (message_type, wire) in [
        (MessageType::Notification, "NOTIFICATION"),
        (MessageType::Ping, "PING"),
        (MessageType::Pong, "PONG"),
        (MessageType::SystemConnected, "SYSTEM_CONNECTED"),
        (MessageType::SystemDisconnected, "SYSTEM_DISCONNECTED"),
        (MessageType::SystemError, "SYSTEM_ERROR"),
        (MessageType::ParseError, "PARSE_ERROR"),
    ] {
        assert_eq!(message_type.as_str(), wire);
        assert_eq!(MessageType::from(wire), message_type);
    }
}

#[test]
fn test_message_type_unknown_preserves_string() {
    let unknown = MessageType::from("DEFENSE_SCHEDULED");
    assert_eq!(unknown, MessageType::Unknown("DEFENSE_SCHEDULED".to_string()));
    assert_eq!(unknown.as_str(), "DEFENSE_SCHEDULED");
    assert!(!unknown.is_system());
}

#[test]
fn test_message_type_classification() {
    assert!(!MessageType::Notification.is_system());
    assert!(MessageType::Pong.is_system());
    assert!(MessageType::SystemConnected.is_system());
    assert!(MessageType::ParseError.is_system());
}

// ==================== MessageEnvelope Tests ====================

#[test]
fn test_envelope_serializes_to_wire_shape() {
    let envelope = MessageEnvelope::notification(sample_notification());
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(value["type"], "NOTIFICATION");
    assert_eq!(value["data"]["id"], 42);
    assert_eq!(value["data"]["recipientRef"]["id"], 7);
    assert_eq!(value["data"]["kind"], "INFO");
    assert_eq!(value["data"]["createdAt"], "2026-01-15T10:00:00Z");
    // Unstamped fields are omitted entirely
    assert!(value.get("timestamp").is_none());
    assert!(value.get("id").is_none());
}

#[test]
fn test_envelope_parse_classifies_notification_payload() {
    let raw = r#"{
        "type": "NOTIFICATION",
        "data": {
            "id": 42,
            "recipientRef": {"id": 7},
            "title": "Reminder",
            "message": "Re-inscription window closes soon",
            "kind": "REMINDER",
            "createdAt": "2026-01-15T10:00:00Z",
            "read": false
        },
        "timestamp": "2026-01-15T10:00:01Z",
        "id": "frame-1"
    }"#;

    let envelope = MessageEnvelope::parse(raw);

    assert_eq!(envelope.message_type, MessageType::Notification);
    assert_eq!(envelope.id.as_deref(), Some("frame-1"));
    assert!(envelope.timestamp.is_some());

    let notification = envelope.data.as_notification().expect("typed payload");
    assert_eq!(notification.id, 42);
    assert_eq!(notification.kind, NotificationKind::Reminder);
    assert!(notification.read_at.is_none());
    assert!(notification.recipient_ref.username.is_none());
}

#[test]
fn test_envelope_parse_converts_malformed_payload() {
    let envelope = MessageEnvelope::parse("not json at all");

    assert_eq!(envelope.message_type, MessageType::ParseError);
    let data = envelope.data.as_parse_error().expect("parse error payload");
    assert_eq!(data.raw_data, "not json at all");
}

#[test]
fn test_envelope_parse_keeps_unknown_frames_raw() {
    let envelope = MessageEnvelope::parse(r#"{"type":"DEFENSE_SCHEDULED","data":{"room":"B12"}}"#);

    assert_eq!(
        envelope.message_type,
        MessageType::Unknown("DEFENSE_SCHEDULED".to_string())
    );
    let raw = envelope.data.as_raw().expect("raw payload");
    assert_eq!(raw["room"], "B12");

    // The unknown tag round-trips on re-serialization.
    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["type"], "DEFENSE_SCHEDULED");
}

#[test]
fn test_envelope_parse_tolerates_missing_data_and_timestamp() {
    let envelope = MessageEnvelope::parse(r#"{"type":"PONG"}"#);

    assert_eq!(envelope.message_type, MessageType::Pong);
    assert!(envelope.timestamp.is_none());
    assert_eq!(envelope.data, EnvelopeData::Raw(serde_json::Value::Null));
}

#[test]
fn test_envelope_notification_with_unexpected_payload_stays_raw() {
    let envelope = MessageEnvelope::parse(r#"{"type":"NOTIFICATION","data":{"bogus":true}}"#);

    assert_eq!(envelope.message_type, MessageType::Notification);
    assert!(envelope.data.as_notification().is_none());
    assert_eq!(envelope.data.as_raw().unwrap()["bogus"], true);
}

#[test]
fn test_parse_error_data_wire_field_name() {
    let data = ParseErrorData {
        raw_data: "garbled".to_string(),
    };
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["rawData"], "garbled");
}

// ==================== Notification Tests ====================

#[test]
fn test_notification_serde_camel_case() {
    let notification = sample_notification();
    let value = serde_json::to_value(&notification).unwrap();

    assert_eq!(value["recipientRef"]["username"], "doctorant");
    assert_eq!(value["createdAt"], "2026-01-15T10:00:00Z");
    assert!(value.get("readAt").is_none(), "unset readAt should be omitted");
    assert_eq!(value["read"], false);

    let parsed: Notification = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, notification);
}

#[test]
fn test_notification_kind_wire_form() {
    assert_eq!(serde_json::to_value(NotificationKind::Warning).unwrap(), "WARNING");
    let parsed: NotificationKind = serde_json::from_value(json!("SUCCESS")).unwrap();
    assert_eq!(parsed, NotificationKind::Success);
    assert_eq!(NotificationKind::Reminder.to_string(), "REMINDER");
}

// ==================== REST body Tests ====================

#[test]
fn test_notification_settings_serde() {
    let settings = NotificationSettings::default();
    let value = serde_json::to_value(&settings).unwrap();

    assert_eq!(value["emailEnabled"], true);
    assert_eq!(value["pushEnabled"], true);
    assert_eq!(value["remindersEnabled"], true);
}

#[test]
fn test_send_notification_request_serde() {
    let request = SendNotificationRequest::new(7, "Title", "Body", NotificationKind::Warning);
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["recipientId"], 7);
    assert_eq!(value["kind"], "WARNING");
}
