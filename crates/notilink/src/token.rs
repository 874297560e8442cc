//! Access-token lookup.
//!
//! The client never owns authentication; it reads the bearer token from a
//! store injected at construction. In the application this is backed by the
//! same persisted storage the auth layer writes to.

use parking_lot::RwLock;

/// Source of the bearer credential used for the socket URL and REST calls.
///
/// Returning `None` means "not signed in": the client skips the socket
/// entirely and falls back to polling.
pub trait AccessTokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// In-memory token store for applications and tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replace the stored token.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Drop the stored token (sign-out).
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl AccessTokenStore for MemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
