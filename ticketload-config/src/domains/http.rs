//! Wire settings shared by every simulated user's client
//!
//! `timeout` bounds a single attempt, not a whole request: with the default
//! retry policy a request against a hung backend can take three timeouts
//! plus the backoff between them before the caller hears about it.

use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-attempt deadline, connect through last body byte (default 30 s)
    #[serde(with = "crate::domains::utils::duration_secs")]
    pub timeout: Duration,

    /// Redirect hops followed before giving up; 0 returns the 3xx as is
    pub max_redirects: u32,

    /// `User-Agent` header, so load shows up distinctly in backend logs
    pub user_agent: String,

    /// Off only for targets with self-signed certificates
    pub verify_ssl: bool,

    pub connection_pool: ConnectionPoolConfig,
}

/// Keep-alive pool owned by each client
///
/// Every simulated user holds its own pool, so `max_idle_per_host` is per
/// user, not per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionPoolConfig {
    pub max_idle_per_host: usize,

    #[serde(with = "crate::domains::utils::duration_secs")]
    pub idle_timeout: Duration,

    /// Deadline for TCP and TLS setup alone; a miss counts as a connect failure
    #[serde(with = "crate::domains::utils::duration_secs")]
    pub connection_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            user_agent: concat!("ticketload/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_ssl: true,
            connection_pool: ConnectionPoolConfig::default(),
        }
    }
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

fn require_nonzero(value: Duration, field: &str, domain: &str) -> ConfigResult<()> {
    if value.is_zero() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be longer than zero", field),
        });
    }
    Ok(())
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        require_nonzero(self.timeout, "timeout", self.domain_name())?;
        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;
        self.connection_pool.validate()
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

impl Validatable for ConnectionPoolConfig {
    fn validate(&self) -> ConfigResult<()> {
        // An idle pool of zero is allowed: it forces a fresh connection per request
        require_nonzero(self.idle_timeout, "idle_timeout", self.domain_name())?;
        require_nonzero(
            self.connection_timeout,
            "connection_timeout",
            self.domain_name(),
        )
    }

    fn domain_name(&self) -> &'static str {
        "http.connection_pool"
    }
}
