//! REST companion methods.
//!
//! Thin stateless wrappers around a shared HTTP client. Errors propagate to
//! the caller unmodified; only the polling loop in [`crate::client`] catches
//! its own fetch failures.

use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Method};
use url::Url;

use crate::error::Result;
use crate::model::{
    Notification, NotificationFilter, NotificationPage, PendingNotifications, UnreadCount,
};
use crate::token::AccessTokenStore;

/// Authenticated client for the `/api/notifications/` namespace.
#[derive(Clone)]
pub struct NotificationApi {
    http: Client,
    base_url: Url,
    tokens: Arc<dyn AccessTokenStore>,
}

impl fmt::Debug for NotificationApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationApi")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl NotificationApi {
    /// Create an API client rooted at `base_url`.
    pub fn new(http: Client, base_url: &str, tokens: Arc<dyn AccessTokenStore>) -> Result<Self> {
        // Url::join treats a base without a trailing slash as a file path.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
            tokens,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.base_url.join(path)?;
        let mut request = self.http.request(method, url);
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    /// List notifications with paging and filter parameters.
    pub async fn list(&self, filter: &NotificationFilter) -> Result<NotificationPage> {
        let response = self
            .request(Method::GET, "api/notifications/")?
            .query(filter)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Fetch a single notification.
    pub async fn get(&self, id: &str) -> Result<Notification> {
        let response = self
            .request(Method::GET, &format!("api/notifications/{id}/"))?
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Mark one notification as read.
    pub async fn mark_as_read(&self, id: &str) -> Result<()> {
        self.request(Method::POST, &format!("api/notifications/mark-read/{id}/"))?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Mark every notification as read.
    pub async fn mark_all_as_read(&self) -> Result<()> {
        self.request(Method::POST, "api/notifications/mark-read/")?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Number of unread notifications.
    pub async fn unread_count(&self) -> Result<u64> {
        let response = self
            .request(Method::GET, "api/notifications/unread-count/")?
            .send()
            .await?
            .error_for_status()?;
        let count: UnreadCount = response.json().await?;
        Ok(count.unread_count)
    }

    /// Delete a notification.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.request(Method::DELETE, &format!("api/notifications/{id}/"))?
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetch pending notifications; the poll source of the fallback loop.
    pub async fn pending(&self) -> Result<Vec<Notification>> {
        let response = self
            .request(Method::GET, "api/notifications/pending/")?
            .send()
            .await?
            .error_for_status()?;
        let pending: PendingNotifications = response.json().await?;
        Ok(pending.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = NotificationApi::new(
            Client::new(),
            "http://localhost:8000",
            Arc::new(MemoryTokenStore::new()),
        )
        .unwrap();
        assert_eq!(api.base_url.as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = NotificationApi::new(
            Client::new(),
            "not a url",
            Arc::new(MemoryTokenStore::new()),
        );
        assert!(result.is_err());
    }
}
