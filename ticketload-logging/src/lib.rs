//! Logging setup for ticketload
//!
//! Everything in the workspace logs through `tracing` (the config and
//! resilience crates use `log`, which the subscriber bridges). This crate
//! only decides where those events go and in what shape: one global fmt
//! subscriber, filtered by the configured level unless `RUST_LOG` says
//! otherwise.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
pub use ticketload_config::{LogFormat, LogLevel, LoggingConfig};
