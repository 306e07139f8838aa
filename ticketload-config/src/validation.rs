//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate an http(s) URL
pub fn validate_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }

    let parsed = url::Url::parse(url).map_err(|e| ConfigError::DomainError {
        domain: domain.to_string(),
        message: format!("{} has invalid URL format: {}", field_name, e),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} scheme '{}' not supported (only http/https)",
                field_name, scheme
            ),
        }),
    }
}

/// Validate a request path such as `/api/auth/login`
pub fn validate_path(path: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    validate_required_string(path, field_name, domain)?;
    if !path.starts_with('/') {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must start with '/', got '{}'", field_name, path),
        });
    }
    Ok(())
}

/// Validate an HTTP status code
pub fn validate_status_code(code: u16, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !(100..=599).contains(&code) {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} contains invalid HTTP status {}", field_name, code),
        });
    }
    Ok(())
}

/// Validate a complete configuration object
pub fn validate_config(config: &crate::domains::TicketloadConfig) -> ConfigResult<()> {
    config.validate_all()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("https://host", "base_url", "target").is_ok());
        assert!(validate_url("http://localhost:8080", "base_url", "target").is_ok());
        assert!(validate_url("ftp://host", "base_url", "target").is_err());
        assert!(validate_url("not-a-url", "base_url", "target").is_err());
        assert!(validate_url("", "base_url", "target").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/api/auth/login", "auth_path", "target").is_ok());
        assert!(validate_path("api/auth/login", "auth_path", "target").is_err());
        assert!(validate_path("  ", "auth_path", "target").is_err());
    }

    #[test]
    fn test_validate_status_code() {
        assert!(validate_status_code(503, "status_forcelist", "retry").is_ok());
        assert!(validate_status_code(99, "status_forcelist", "retry").is_err());
        assert!(validate_status_code(600, "status_forcelist", "retry").is_err());
    }
}
