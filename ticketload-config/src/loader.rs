//! Configuration loading and environment variable handling

use crate::domains::utils::parse_seconds;
use crate::domains::TicketloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "TICKETLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<TicketloadConfig> {
        let config = self.load_unvalidated(Some(path))?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<TicketloadConfig> {
        let config = self.load_unvalidated(None::<&Path>)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<TicketloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// File (or defaults) plus environment overrides, without validation
    ///
    /// For callers that layer further overrides on top and call
    /// `validate_all` themselves once everything is applied.
    pub fn load_unvalidated(
        &self,
        config_path: Option<impl AsRef<Path>>,
    ) -> ConfigResult<TicketloadConfig> {
        let mut config = match config_path {
            Some(path) => Self::read_file(path)?,
            None => TicketloadConfig::default(),
        };
        self.apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Parse a YAML file exactly as written: no environment overrides, no validation
    pub fn read_file(path: impl AsRef<Path>) -> ConfigResult<TicketloadConfig> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut TicketloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_retry_overrides(&mut config.retry)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(environment) = self.get_env_var("ENVIRONMENT") {
            config.environment = environment;
        }

        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = Some(base_url);
        }

        let email = self.get_env_var("AUTH_EMAIL").ok();
        let password = self.get_env_var("AUTH_PASSWORD").ok();
        match (email, password) {
            (Some(email), Some(password)) => {
                config.credentials = Some(crate::domains::target::Credentials { email, password });
            }
            (None, None) => {}
            (email, password) => {
                // A lone variable only patches credentials that already exist
                let Some(ref mut credentials) = config.credentials else {
                    return Err(ConfigError::EnvError(format!(
                        "{}_AUTH_EMAIL and {}_AUTH_PASSWORD must be set together",
                        self.prefix, self.prefix
                    )));
                };
                if let Some(email) = email {
                    credentials.email = email;
                }
                if let Some(password) = password {
                    credentials.password = password;
                }
            }
        }

        Ok(())
    }

    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(raw) = self.get_env_var("HTTP_TIMEOUT") {
            config.timeout = parse_seconds(&raw)
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Some(verify_ssl) = self.parse_env_var::<bool>("HTTP_VERIFY_SSL")? {
            config.verify_ssl = verify_ssl;
        }

        Ok(())
    }

    fn apply_retry_overrides(
        &self,
        config: &mut crate::domains::retry::RetryConfig,
    ) -> ConfigResult<()> {
        if let Some(total) = self.parse_env_var::<u32>("RETRY_TOTAL")? {
            config.total = total;
        }

        if let Some(factor) = self.parse_env_var::<f64>("RETRY_BACKOFF_FACTOR")? {
            config.backoff_factor = factor;
        }

        if let Ok(list) = self.get_env_var("RETRY_STATUS_FORCELIST") {
            config.status_forcelist = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<u16>().map_err(|e| {
                        ConfigError::EnvError(format!(
                            "Invalid {}_RETRY_STATUS_FORCELIST entry '{}': {}",
                            self.prefix, s, e
                        ))
                    })
                })
                .collect::<ConfigResult<Vec<_>>>()?;
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }

    /// Parse an optional prefixed environment variable
    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e))),
            Err(_) => Ok(None),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
