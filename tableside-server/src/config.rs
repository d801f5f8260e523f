//! Server configuration

use std::time::Duration;

use crate::notifications::PolicyWindows;

/// Notification server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | ENVIRONMENT | development | development, staging or production |
/// | HTTP_PORT | 8080 | HTTP listen port |
/// | DATA_DIR | ./data | Main database and tenant databases |
/// | LOG_LEVEL | info | Default log filter (RUST_LOG takes precedence) |
/// | LOG_JSON | false | JSON log output |
/// | LOG_DIR | (unset) | Enables daily rotating log files |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | TABLE_CACHE_TTL_SECS | 300 | Table directory cache TTL |
/// | DEDUP_WINDOW_SECS | 60 | Duplicate suppression window |
/// | RATE_LIMIT_WINDOW_SECS | 3600 | Per-table rate limit window |
/// | RATE_LIMIT_MAX | 5 | Notifications per table within the window |
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub http_port: u16,
    pub data_dir: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
    pub table_cache_ttl_secs: u64,
    pub policy: PolicyWindows,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let policy = PolicyWindows {
            dedup_window: env_parse("DEDUP_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.policy.dedup_window),
            rate_window: env_parse("RATE_LIMIT_WINDOW_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.policy.rate_window),
            rate_limit: env_parse("RATE_LIMIT_MAX").unwrap_or(defaults.policy.rate_limit),
        };

        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            http_port: env_parse("HTTP_PORT").unwrap_or(defaults.http_port),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: env_parse("LOG_JSON").unwrap_or(defaults.log_json),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS")
                .unwrap_or(defaults.request_timeout_ms),
            table_cache_ttl_secs: env_parse("TABLE_CACHE_TTL_SECS")
                .unwrap_or(defaults.table_cache_ttl_secs),
            policy,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn table_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.table_cache_ttl_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            data_dir: "./data".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            request_timeout_ms: 30_000,
            table_cache_ttl_secs: 300,
            policy: PolicyWindows::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
