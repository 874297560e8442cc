//! Notilink: real-time notification delivery client.
//!
//! Maintains a live channel to a notification-producing backend, preferring a
//! persistent WebSocket and degrading gracefully to periodic polling when the
//! socket cannot be established or keeps failing.
//!
//! ## Core Types
//!
//! - [`NotificationClient`] - Dual-mode delivery client (socket + polling fallback)
//! - [`ConnectionState`] - Lifecycle state (`Idle`/`Connecting`/`Connected`/`Polling`)
//! - [`Notification`] - A delivered notification record
//! - [`NotificationEvent`] - What the caller's message handler receives
//! - [`NotificationApi`] - REST companion (list, read-state, unread count, delete)
//!
//! ## Configuration & Credentials
//!
//! - [`ClientConfig`] - Endpoints, backoff schedule, poll cadence
//! - [`AccessTokenStore`] - Bearer-credential source injected at construction
//! - [`MemoryTokenStore`] - In-memory store for applications and tests
//!
//! ## Lifecycle
//!
//! Construct one client per session, call [`NotificationClient::connect`]
//! with a message handler and a connectivity handler, and
//! [`NotificationClient::disconnect`] on sign-out. Reconnection backs off
//! exponentially; after the attempt budget is exhausted the client polls for
//! the rest of the session.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod model;
pub mod token;

pub use api::NotificationApi;
pub use client::{ConnectionState, NotificationClient};
pub use config::ClientConfig;
pub use error::{NotifyError, Result};
pub use message::{ClientMessage, NotificationEvent, ServerMessage};
pub use model::{
    Notification, NotificationFilter, NotificationKind, NotificationPage, PendingNotifications,
    UnreadCount,
};
pub use token::{AccessTokenStore, MemoryTokenStore};
