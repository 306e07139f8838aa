//! Helpers shared by the configuration domains

use std::time::Duration;

/// Durations written as seconds, e.g. `timeout: 30` or `timeout: 2.5`
///
/// Whole seconds serialize as integers so generated samples stay readable.
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Whole(u64),
        Fractional(f64),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() == 0 {
            serializer.serialize_u64(duration.as_secs())
        } else {
            serializer.serialize_f64(duration.as_secs_f64())
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Seconds::deserialize(deserializer)? {
            Seconds::Whole(seconds) => Ok(Duration::from_secs(seconds)),
            Seconds::Fractional(seconds) => {
                Duration::try_from_secs_f64(seconds).map_err(serde::de::Error::custom)
            }
        }
    }
}

/// Parse a seconds value as written in an environment variable
pub fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    let seconds: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", raw))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("'{}': {}", raw, e))
}

pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}
