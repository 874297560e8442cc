//! Socket wire envelope.
//!
//! Every frame is a JSON object discriminated by a `type` field. Recognized
//! inbound kinds get typed handling; anything else is forwarded to the caller
//! as an opaque value so future server-side kinds don't require a client
//! update.

use serde::Serialize;
use serde_json::Value;

use crate::error::{NotifyError, Result};
use crate::model::Notification;

/// Outbound client-to-server messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Delivery confirmation for an `ack_request`
    Ack { notification_id: String },
    /// Mark one notification read over the socket
    MarkRead { notification_id: String },
    /// Mark every notification read over the socket
    MarkAllRead,
    /// Liveness probe
    Ping,
}

/// Decoded inbound socket frame.
#[derive(Debug, Clone)]
pub enum ServerMessage {
    /// A freshly created notification to hand to the caller
    NewNotification(Notification),
    /// Delivery-confirmation handshake; answered internally, never
    /// surfaced to the caller
    AckRequest { notification_id: String },
    /// Unrecognized `type`; forwarded verbatim
    Raw(Value),
}

/// Event delivered to the caller's message handler.
///
/// Socket pushes and polling cycles both dispatch through this type, so the
/// caller sees one shape regardless of the active transport.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    Notification(Notification),
    Raw(Value),
}

/// Decode one text frame into a [`ServerMessage`].
///
/// Non-JSON frames and frames without a string `type` field are errors; the
/// connection handler drops and logs them rather than tearing the socket down.
pub(crate) fn decode_frame(text: &str) -> Result<ServerMessage> {
    let value: Value = serde_json::from_str(text)?;

    let Some(kind) = value.get("type").and_then(Value::as_str) else {
        return Err(NotifyError::protocol("frame has no `type` field"));
    };

    match kind {
        "new_notification" => {
            let notification = value.get("notification").cloned().ok_or_else(|| {
                NotifyError::protocol("new_notification frame without `notification`")
            })?;
            Ok(ServerMessage::NewNotification(serde_json::from_value(
                notification,
            )?))
        }
        "ack_request" => {
            let notification_id = value
                .get("notification_id")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    NotifyError::protocol("ack_request frame without `notification_id`")
                })?;
            Ok(ServerMessage::AckRequest {
                notification_id: notification_id.to_string(),
            })
        }
        _ => Ok(ServerMessage::Raw(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NotificationKind;
    use serde_json::json;

    #[test]
    fn test_decode_new_notification() {
        let frame = r#"{
            "type": "new_notification",
            "notification": {
                "id": "1",
                "event": "report_ready",
                "created_at": "2026-02-01T08:30:00Z"
            }
        }"#;

        match decode_frame(frame).unwrap() {
            ServerMessage::NewNotification(n) => {
                assert_eq!(n.id, "1");
                assert_eq!(n.event, NotificationKind::ReportReady);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_ack_request() {
        let frame = r#"{"type":"ack_request","notification_id":"X"}"#;

        match decode_frame(frame).unwrap() {
            ServerMessage::AckRequest { notification_id } => {
                assert_eq!(notification_id, "X");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_type_is_forwarded_raw() {
        let frame = r#"{"type":"vendor_hint","payload":{"k":"v"}}"#;

        match decode_frame(frame).unwrap() {
            ServerMessage::Raw(value) => {
                assert_eq!(value["type"], "vendor_hint");
                assert_eq!(value["payload"]["k"], "v");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_missing_type() {
        assert!(decode_frame(r#"{"notification_id":"X"}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(decode_frame("not json at all").is_err());
    }

    #[test]
    fn test_client_message_encoding() {
        assert_eq!(
            serde_json::to_value(ClientMessage::Ack {
                notification_id: "X".to_string()
            })
            .unwrap(),
            json!({"type": "ack", "notification_id": "X"})
        );
        assert_eq!(
            serde_json::to_value(ClientMessage::MarkRead {
                notification_id: "7".to_string()
            })
            .unwrap(),
            json!({"type": "mark_read", "notification_id": "7"})
        );
        assert_eq!(
            serde_json::to_value(ClientMessage::MarkAllRead).unwrap(),
            json!({"type": "mark_all_read"})
        );
        assert_eq!(
            serde_json::to_value(ClientMessage::Ping).unwrap(),
            json!({"type": "ping"})
        );
    }
}
