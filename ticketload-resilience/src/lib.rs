//! Resilience patterns for ticketload
//!
//! This crate provides the retry policy applied to outbound requests: which
//! outcomes count as transient, how long to wait between attempts, and an
//! executor that drives the attempts. It knows nothing about the transport;
//! callers plug in through the [`Retryable`] and [`StatusResponse`] traits.

pub mod backoff;
pub mod retry;

// Re-export commonly used types
pub use backoff::{parse_retry_after, BackoffCalculator, RETRY_AFTER_STATUSES};
pub use retry::{FailureKind, RetryError, RetryExecutor, RetryPolicy, Retryable, StatusResponse};
