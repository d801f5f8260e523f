//! Client configuration

use std::time::Duration;

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL (e.g., "http://localhost:8080")
    pub base_url: String,

    /// Sent as `X-Tenant-Id`; without it the server resolves the tenant by host
    pub tenant_id: Option<i64>,

    /// Badge refresh interval
    pub poll_interval: Duration,

    /// Request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tenant_id: None,
            poll_interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_tenant(mut self, tenant_id: i64) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// `TABLESIDE_URL`, `TABLESIDE_TENANT_ID`, `FEED_POLL_INTERVAL_SECS`
    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("TABLESIDE_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
        );
        config.tenant_id = std::env::var("TABLESIDE_TENANT_ID")
            .ok()
            .and_then(|v| v.parse().ok());
        if let Some(secs) = std::env::var("FEED_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config = config.with_poll_interval(Duration::from_secs(secs));
        }
        config
    }
}
