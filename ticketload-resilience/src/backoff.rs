//! Backoff delays between retry attempts

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Statuses whose `Retry-After` header is honoured
pub const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Exponential backoff without jitter
///
/// The delay after the n-th consecutive failure is `0` for the first one and
/// `factor * 2^(n-1)` afterwards, never exceeding `max_delay`.
#[derive(Debug, Clone)]
pub struct BackoffCalculator {
    factor: f64,
    max_delay: Duration,
}

impl BackoffCalculator {
    /// Create a new backoff calculator
    pub fn new(factor: f64, max_delay: Duration) -> Self {
        Self {
            factor: factor.max(0.0),
            max_delay,
        }
    }

    /// Calculate the delay after `consecutive_failures` failed attempts (1-indexed)
    pub fn calculate_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures <= 1 || self.factor == 0.0 {
            return Duration::ZERO;
        }

        let exponent = (consecutive_failures - 1).min(64) as i32;
        let seconds = self.factor * 2f64.powi(exponent);

        if !seconds.is_finite() || seconds >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(seconds)
        }
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }
}

/// Parse a `Retry-After` header value
///
/// Accepts delta-seconds or an HTTP date. Dates in the past yield a zero
/// delay; anything else unparseable yields `None`.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}
