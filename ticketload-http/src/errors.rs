//! HTTP error types

use crate::types::HttpMethodError;
use ticketload_resilience::{FailureKind, RetryError, Retryable};

/// Failure to get any response out of a transport
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request never reached the server
    #[error("Connection failed: {0}")]
    Connect(String),

    /// No response within the timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The exchange broke after the request was sent
    #[error("Failed reading response: {0}")]
    Read(String),

    /// The request could not be built or sent at all
    #[error("Request could not be sent: {0}")]
    Invalid(String),
}

impl Retryable for TransportError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            TransportError::Connect(_) => FailureKind::Connect,
            TransportError::Timeout(_) | TransportError::Read(_) => FailureKind::Read,
            TransportError::Invalid(_) => FailureKind::Fatal,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let message = error.to_string();
        if error.is_connect() {
            TransportError::Connect(message)
        } else if error.is_timeout() {
            TransportError::Timeout(message)
        } else if error.is_builder() || error.is_redirect() {
            TransportError::Invalid(message)
        } else {
            TransportError::Read(message)
        }
    }
}

/// Error type for API client operations
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        source: TransportError,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(#[from] HttpMethodError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(String),

    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ticketload_config::ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

impl From<RetryError<TransportError>> for HttpError {
    fn from(error: RetryError<TransportError>) -> Self {
        match error {
            RetryError::MaxAttemptsExceeded {
                attempts,
                last_error,
            } => HttpError::RetriesExhausted {
                attempts,
                source: last_error,
            },
            RetryError::NonRetryableError(error) => HttpError::Transport(error),
        }
    }
}

impl HttpError {
    /// Whether this is a network-level failure rather than a misuse of the client
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            HttpError::RetriesExhausted { .. } | HttpError::Transport(_)
        )
    }
}
