//! Notification records and REST payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event kind attached to a notification.
///
/// The server emits a small closed set of kinds; anything it grows in the
/// future deserializes as [`NotificationKind::Other`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReportReady,
    PaymentFailed,
    PaymentSucceeded,
    AccountSyncFailed,
    BudgetExceeded,
    SubscriptionRenewed,
    #[serde(untagged)]
    Other(String),
}

/// A single notification as delivered over the socket or the REST API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Server-assigned identifier
    pub id: String,
    /// Event kind
    pub event: NotificationKind,
    /// Read/unread flag; mutated server-side only through explicit calls
    #[serde(default)]
    pub is_read: bool,
    /// Short human-readable title
    #[serde(default)]
    pub title: String,
    /// Notification body text
    #[serde(default)]
    pub body: String,
    /// Event-specific payload
    #[serde(default)]
    pub data: Value,
    /// Server-side creation time
    pub created_at: DateTime<Utc>,
}

/// Paging and filter parameters for listing notifications.
///
/// Serializes to query parameters; unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NotificationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<NotificationKind>,
}

impl NotificationFilter {
    /// Filter down to unread notifications only.
    pub fn unread() -> Self {
        Self {
            is_read: Some(false),
            ..Self::default()
        }
    }
}

/// One page of the notification list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPage {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<Notification>,
}

/// Response body of the unread-count endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}

/// Response body of the pending endpoint, consumed by the polling fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingNotifications {
    pub notifications: Vec<Notification>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_serde_round_trip() {
        assert_eq!(
            serde_json::to_value(NotificationKind::ReportReady).unwrap(),
            json!("report_ready")
        );

        let kind: NotificationKind = serde_json::from_value(json!("payment_failed")).unwrap();
        assert_eq!(kind, NotificationKind::PaymentFailed);
    }

    #[test]
    fn test_kind_unknown_falls_back_to_other() {
        let kind: NotificationKind = serde_json::from_value(json!("mystery_event")).unwrap();
        assert_eq!(kind, NotificationKind::Other("mystery_event".to_string()));

        assert_eq!(
            serde_json::to_value(&kind).unwrap(),
            json!("mystery_event")
        );
    }

    #[test]
    fn test_notification_deserialize_defaults() {
        let notification: Notification = serde_json::from_value(json!({
            "id": "42",
            "event": "report_ready",
            "created_at": "2026-01-10T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(notification.id, "42");
        assert_eq!(notification.event, NotificationKind::ReportReady);
        assert!(!notification.is_read);
        assert!(notification.title.is_empty());
        assert_eq!(notification.data, Value::Null);
    }

    #[test]
    fn test_filter_omits_unset_fields() {
        let filter = NotificationFilter {
            page: Some(2),
            ..NotificationFilter::default()
        };
        assert_eq!(serde_json::to_value(&filter).unwrap(), json!({"page": 2}));

        let empty = NotificationFilter::default();
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));
    }

    #[test]
    fn test_unread_filter() {
        let filter = NotificationFilter::unread();
        assert_eq!(filter.is_read, Some(false));
        assert!(filter.page.is_none());
    }
}
