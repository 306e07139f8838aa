//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod retry;
pub mod target;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main ticketload configuration combining all domains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TicketloadConfig {
    /// Backend under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Retry policy applied to every request
    #[serde(default)]
    pub retry: retry::RetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl TicketloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.http.validate()?;
        self.retry.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = TicketloadConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
