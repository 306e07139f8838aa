//! Caller-side status expectations for single requests

use std::fmt;

/// Statuses a request is allowed to end with
///
/// Empty means "any 2xx". Probes that should be rejected (a non-admin
/// hitting an admin endpoint) list the rejection status explicitly, so a
/// 403 can count as success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusExpectation {
    accepted: Vec<u16>,
}

impl StatusExpectation {
    pub fn new(accepted: impl IntoIterator<Item = u16>) -> Self {
        let mut accepted: Vec<u16> = accepted.into_iter().collect();
        accepted.sort_unstable();
        accepted.dedup();
        Self { accepted }
    }

    pub fn is_met_by(&self, status: u16) -> bool {
        if self.accepted.is_empty() {
            (200..300).contains(&status)
        } else {
            self.accepted.contains(&status)
        }
    }
}

impl fmt::Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.accepted.is_empty() {
            return write!(f, "any 2xx");
        }
        let codes: Vec<String> = self.accepted.iter().map(u16::to_string).collect();
        write!(f, "one of {}", codes.join(", "))
    }
}
