//! Client configuration.

use std::time::Duration;

/// Configuration for the notification client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint; the access token is appended as a `token`
    /// query parameter
    pub ws_url: String,
    /// Base URL of the REST API
    pub api_base_url: String,
    /// Reconnect attempts before the permanent switch to polling
    pub max_reconnect_attempts: u32,
    /// Delay before the first reconnect attempt; doubles per attempt
    pub initial_reconnect_delay_ms: u64,
    /// Poll cadence while in fallback mode
    pub poll_interval: Duration,
    /// Timeout applied to REST requests
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for the given endpoints with default timing.
    pub fn new(ws_url: impl Into<String>, api_base_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000/ws/notifications/".to_string(),
            api_base_url: "http://localhost:8000".to_string(),
            max_reconnect_attempts: 5,
            initial_reconnect_delay_ms: 1000,
            poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let config = ClientConfig::default();
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.initial_reconnect_delay_ms, 1000);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_new_keeps_default_timing() {
        let config = ClientConfig::new("ws://example/ws/notifications/", "http://example");
        assert_eq!(config.ws_url, "ws://example/ws/notifications/");
        assert_eq!(config.api_base_url, "http://example");
        assert_eq!(config.max_reconnect_attempts, 5);
    }
}
