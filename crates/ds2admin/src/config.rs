//! Client configuration.

use std::time::Duration;

use crate::notify::DEFAULT_NOTIFICATION_TTL;
use crate::types::AdminUrl;

/// HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the gateway and the notification queue.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ds2admin::{AdminUrl, ClientConfig};
///
/// let config = ClientConfig::new(AdminUrl::new("http://localhost:5001").unwrap())
///     .with_request_timeout(Duration::from_secs(10));
/// assert_eq!(config.request_timeout, Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: AdminUrl,
    pub request_timeout: Duration,
    pub notification_ttl: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: AdminUrl) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
            user_agent: concat!("ds2admin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
