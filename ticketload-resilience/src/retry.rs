//! Retry policy and executor

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use ticketload_config::RetryConfig;

use crate::backoff::{BackoffCalculator, RETRY_AFTER_STATUSES};

/// Retry policy applied uniformly to every request of a client
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub total: u32,

    /// Multiplier for the exponential delay between attempts
    pub backoff_factor: f64,

    /// Upper bound for any single delay
    pub backoff_max: Duration,

    /// Response statuses considered transient
    pub retryable_statuses: BTreeSet<u16>,

    /// Upper-case methods that may be re-sent once the server could have seen them
    pub allowed_methods: BTreeSet<String>,

    /// Whether `Retry-After` replaces the computed delay
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            total: config.total.max(1),
            backoff_factor: config.backoff_factor,
            backoff_max: config.backoff_max,
            retryable_statuses: config.status_forcelist.iter().copied().collect(),
            allowed_methods: config
                .allowed_methods
                .iter()
                .map(|m| m.to_ascii_uppercase())
                .collect(),
            respect_retry_after: config.respect_retry_after,
        }
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::from(&config)
    }
}

impl RetryPolicy {
    /// A policy that sends every request exactly once
    pub fn no_retries() -> Self {
        Self {
            total: 1,
            ..Self::default()
        }
    }

    /// Same policy with a different attempt budget
    pub fn with_total(mut self, total: u32) -> Self {
        self.total = total.max(1);
        self
    }

    /// Same policy with a different backoff factor
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Same policy with a different set of transient statuses
    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_statuses = statuses.into_iter().collect();
        self
    }

    /// Whether a request with this method may be re-sent after reaching the server
    pub fn is_method_retryable(&self, method: &str) -> bool {
        self.allowed_methods.contains(&method.to_ascii_uppercase())
    }

    /// Whether the status is in the transient set
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Whether a response warrants another attempt
    pub fn should_retry_response(&self, method: &str, status: u16) -> bool {
        self.is_retryable_status(status) && self.is_method_retryable(method)
    }

    /// Whether a transport failure warrants another attempt
    pub fn should_retry_error<E: Retryable>(&self, method: &str, error: &E) -> bool {
        match error.failure_kind() {
            FailureKind::Connect => true,
            FailureKind::Read => self.is_method_retryable(method),
            FailureKind::Fatal => false,
        }
    }

    /// Delay after `attempt` consecutive failed attempts
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        BackoffCalculator::new(self.backoff_factor, self.backoff_max).calculate_delay(attempt)
    }

    /// Delay after a retryable response, honouring `Retry-After` when enabled
    pub fn delay_for_response<R: StatusResponse>(&self, attempt: u32, response: &R) -> Duration {
        if self.respect_retry_after && RETRY_AFTER_STATUSES.contains(&response.status_code()) {
            if let Some(delay) = response.retry_after() {
                return delay.min(self.backoff_max);
            }
        }
        self.delay_for_attempt(attempt)
    }
}

/// How a transport failure relates to the request reaching the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never left the client (DNS, refused, TLS handshake)
    Connect,
    /// The server may have received the request (timeout, reset mid-response)
    Read,
    /// Not transient; retrying cannot help
    Fatal,
}

/// Trait for transport errors that can be retried
pub trait Retryable {
    /// Classify the failure
    fn failure_kind(&self) -> FailureKind;

    /// Whether this error is transient at all
    fn is_retryable(&self) -> bool {
        self.failure_kind() != FailureKind::Fatal
    }
}

/// Trait for responses whose status decides whether to retry
pub trait StatusResponse {
    fn status_code(&self) -> u16;

    /// Delay requested by the server, if any
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Retry executor
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    /// Create a new retry executor with the given policy
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    /// Create with default policy
    pub fn with_default_policy() -> Self {
        Self::new(RetryPolicy::default())
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a request with retry logic
    pub async fn execute<F, Fut, T, E>(&self, method: &str, mut f: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: StatusResponse,
        E: Retryable + Display,
    {
        self.execute_with_context(method, |_attempt| f()).await
    }

    /// Execute a request with retry logic and attempt context
    ///
    /// A retryable status on the last attempt is returned as `Ok`; only
    /// transport failures become errors.
    pub async fn execute_with_context<F, Fut, T, E>(
        &self,
        method: &str,
        mut f: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: StatusResponse,
        E: Retryable + Display,
    {
        let total = self.policy.total.max(1);
        let mut attempt = 1;

        loop {
            debug!("Executing {} attempt {} of {}", method, attempt, total);

            match f(attempt).await {
                Ok(response) => {
                    let status = response.status_code();

                    if attempt < total && self.policy.should_retry_response(method, status) {
                        let delay = self.policy.delay_for_response(attempt, &response);
                        warn!(
                            "{} attempt {} returned transient status {}. Retrying in {:?}",
                            method, attempt, status, delay
                        );
                        pause(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if attempt > 1 {
                        info!("{} finished with status {} after {} attempts", method, status, attempt);
                    }
                    return Ok(response);
                }
                Err(error) => {
                    if !self.policy.should_retry_error(method, &error) {
                        warn!("{} failed with non-retryable error: {}", method, error);
                        return Err(RetryError::NonRetryableError(error));
                    }

                    if attempt >= total {
                        warn!("{} failed after {} attempts: {}", method, attempt, error);
                        return Err(RetryError::MaxAttemptsExceeded {
                            attempts: attempt,
                            last_error: error,
                        });
                    }

                    let delay = self.policy.delay_for_attempt(attempt);
                    warn!(
                        "{} attempt {} failed: {}. Retrying in {:?}",
                        method, attempt, error, delay
                    );
                    pause(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}

/// Retry error types
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Maximum retry attempts exceeded
    #[error("Maximum retry attempts ({attempts}) exceeded. Last error: {last_error}")]
    MaxAttemptsExceeded { attempts: u32, last_error: E },

    /// Non-retryable error encountered
    #[error("Non-retryable error: {0}")]
    NonRetryableError(E),
}

impl<E> RetryError<E> {
    /// Get the underlying error
    pub fn into_inner(self) -> E {
        match self {
            RetryError::MaxAttemptsExceeded { last_error, .. } => last_error,
            RetryError::NonRetryableError(error) => error,
        }
    }

    /// Number of attempts made before giving up
    pub fn attempts(&self) -> Option<u32> {
        match self {
            RetryError::MaxAttemptsExceeded { attempts, .. } => Some(*attempts),
            RetryError::NonRetryableError(_) => None,
        }
    }
}
