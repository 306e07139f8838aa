//! API client configuration

use std::time::Duration;
use ticketload_config::{ConfigError, HttpConfig, TicketloadConfig};
use ticketload_resilience::RetryPolicy;

/// Everything an [`ApiClient`](crate::ApiClient) needs at construction
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL endpoints are resolved against
    pub base_url: String,

    /// Login endpoint
    pub auth_path: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum number of redirects to follow
    pub max_redirects: u32,

    /// User agent string
    pub user_agent: String,

    /// Whether to verify TLS certificates
    pub verify_ssl: bool,

    /// Maximum idle pooled connections per host
    pub max_idle_per_host: usize,

    /// How long idle pooled connections are kept
    pub idle_timeout: Duration,

    /// Connect timeout
    pub connection_timeout: Duration,

    /// Retry policy for every request
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = HttpConfig::default();
        Self {
            base_url: base_url.into(),
            auth_path: "/api/auth/login".to_string(),
            timeout: http.timeout,
            max_redirects: http.max_redirects,
            user_agent: http.user_agent,
            verify_ssl: http.verify_ssl,
            max_idle_per_host: http.connection_pool.max_idle_per_host,
            idle_timeout: http.connection_pool.idle_timeout,
            connection_timeout: http.connection_pool.connection_timeout,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_auth_path(mut self, auth_path: impl Into<String>) -> Self {
        self.auth_path = auth_path.into();
        self
    }
}

impl TryFrom<&TicketloadConfig> for ClientConfig {
    type Error = ConfigError;

    fn try_from(config: &TicketloadConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            base_url: config.target.resolve_base_url()?,
            auth_path: config.target.auth_path.clone(),
            timeout: config.http.timeout,
            max_redirects: config.http.max_redirects,
            user_agent: config.http.user_agent.clone(),
            verify_ssl: config.http.verify_ssl,
            max_idle_per_host: config.http.connection_pool.max_idle_per_host,
            idle_timeout: config.http.connection_pool.idle_timeout,
            connection_timeout: config.http.connection_pool.connection_timeout,
            retry: RetryPolicy::from(&config.retry),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("https://host");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.auth_path, "/api/auth/login");
        assert_eq!(config.retry.total, 3);
        assert!(config.verify_ssl);
    }

    #[test]
    fn test_from_ticketload_config() {
        let mut source = TicketloadConfig::default();
        source.target.environment = "dev".to_string();
        source.http.timeout = Duration::from_secs(5);
        source.retry.total = 7;

        let config = ClientConfig::try_from(&source).unwrap();
        assert_eq!(config.base_url, "https://dev-api.systicket.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry.total, 7);
    }

    #[test]
    fn test_unknown_environment_fails() {
        let mut source = TicketloadConfig::default();
        source.target.environment = "nowhere".to_string();
        assert!(ClientConfig::try_from(&source).is_err());
    }
}
