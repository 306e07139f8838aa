//! Domain-driven configuration management for ticketload
//!
//! Configuration is split by functional domain (target, http, retry,
//! logging). Each domain carries its own defaults and validation, and the
//! loader layers `TICKETLOAD_*` environment variables over an optional
//! YAML file.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    retry::RetryConfig,
    target::{Credentials, TargetConfig},
    TicketloadConfig,
};

// Re-export utilities
pub use domains::utils::{duration_secs, parse_seconds};
