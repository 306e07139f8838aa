//! Retry policy configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_status_code, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry behaviour applied to every request issued by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per request, the first one included
    #[serde(default = "default_total")]
    pub total: u32,

    /// Multiplier for the exponential delay between attempts
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Upper bound for any single delay, in seconds
    #[serde(
        with = "crate::domains::utils::duration_secs",
        default = "default_backoff_max"
    )]
    pub backoff_max: Duration,

    /// Response statuses treated as transient
    #[serde(default = "default_status_forcelist")]
    pub status_forcelist: Vec<u16>,

    /// Methods that may be re-sent after the server could have seen them
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// Whether a `Retry-After` header replaces the computed delay
    #[serde(default = "crate::domains::utils::default_true")]
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            total: default_total(),
            backoff_factor: default_backoff_factor(),
            backoff_max: default_backoff_max(),
            status_forcelist: default_status_forcelist(),
            allowed_methods: default_allowed_methods(),
            respect_retry_after: true,
        }
    }
}

impl Validatable for RetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.total, "total", self.domain_name())?;

        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(self.validation_error(format!(
                "backoff_factor must be a non-negative number, got {}",
                self.backoff_factor
            )));
        }

        for code in &self.status_forcelist {
            validate_status_code(*code, "status_forcelist", self.domain_name())?;
        }

        for method in &self.allowed_methods {
            if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(self.validation_error(format!(
                    "allowed_methods contains invalid method '{}'",
                    method
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "retry"
    }
}

fn default_total() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    1.0
}

fn default_backoff_max() -> Duration {
    Duration::from_secs(120)
}

fn default_status_forcelist() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}

fn default_allowed_methods() -> Vec<String> {
    ["DELETE", "GET", "HEAD", "OPTIONS", "PUT", "TRACE"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}
