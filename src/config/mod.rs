//! Configuration module for the retry executor.
//!
//! A [`RetryConfig`] is fixed once the executor is built. It can be assembled
//! with builder-style setters, loaded from the environment, or deserialized as
//! part of a larger configuration document.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{RetryError, RetryResult};

/// Default number of re-attempts after the first attempt.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Default wait between attempts (500 milliseconds).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Environment variable holding the retry limit.
pub const ENV_RETRY_LIMIT: &str = "RETRY_LIMIT";

/// Environment variable holding the retry delay in milliseconds.
pub const ENV_RETRY_DELAY_MS: &str = "RETRY_DELAY_MS";

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of re-attempts permitted after the first attempt.
    pub retry_limit: u32,
    /// Fixed wait between consecutive attempts.
    #[serde(rename = "retry_delay_ms", with = "duration_ms")]
    pub retry_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryConfig {
    /// Creates a new retry configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry limit.
    pub fn retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Sets the retry delay.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the retry delay in milliseconds.
    pub fn retry_delay_ms(self, millis: u64) -> Self {
        self.retry_delay(Duration::from_millis(millis))
    }

    /// Creates a configuration that runs the operation exactly once.
    pub fn no_retries() -> Self {
        Self {
            retry_limit: 0,
            ..Default::default()
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RETRY_LIMIT` (optional): Maximum number of re-attempts
    /// - `RETRY_DELAY_MS` (optional): Delay between attempts in milliseconds
    ///
    /// Missing variables keep their defaults; present but malformed values are
    /// rejected.
    pub fn from_env() -> RetryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> RetryResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RETRY_LIMIT) {
            config.retry_limit = raw.trim().parse::<u32>().map_err(|e| {
                RetryError::configuration(format!("{ENV_RETRY_LIMIT}={raw:?} is invalid: {e}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_RETRY_DELAY_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|e| {
                RetryError::configuration(format!("{ENV_RETRY_DELAY_MS}={raw:?} is invalid: {e}"))
            })?;
            config.retry_delay = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Returns the maximum number of invocations this configuration allows.
    pub fn max_invocations(&self) -> u64 {
        u64::from(self.retry_limit) + 1
    }

    /// Returns the retry delay in whole milliseconds.
    pub fn delay_millis(&self) -> u64 {
        u64::try_from(self.retry_delay.as_millis()).unwrap_or(u64::MAX)
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(delay: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.retry_limit, 3);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(config.max_invocations(), 4);
    }

    #[test]
    fn test_builder() {
        let config = RetryConfig::new().retry_limit(7).retry_delay_ms(25);
        assert_eq!(config.retry_limit, 7);
        assert_eq!(config.retry_delay, Duration::from_millis(25));
    }

    #[test]
    fn test_no_retries() {
        let config = RetryConfig::no_retries();
        assert_eq!(config.retry_limit, 0);
        assert_eq!(config.max_invocations(), 1);
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = RetryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = RetryConfig::from_lookup(lookup_from(&[
            (ENV_RETRY_LIMIT, "5"),
            (ENV_RETRY_DELAY_MS, " 20 "),
        ]))
        .unwrap();
        assert_eq!(config.retry_limit, 5);
        assert_eq!(config.retry_delay, Duration::from_millis(20));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = RetryConfig::from_lookup(lookup_from(&[(ENV_RETRY_LIMIT, "-1")])).unwrap_err();
        assert!(matches!(err, RetryError::Configuration { .. }));
        assert!(err.to_string().contains(ENV_RETRY_LIMIT));

        let err =
            RetryConfig::from_lookup(lookup_from(&[(ENV_RETRY_DELAY_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_RETRY_DELAY_MS));
    }

    #[test]
    fn test_serde_uses_milliseconds() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"retry_limit": 2, "retry_delay_ms": 150}"#).unwrap();
        assert_eq!(config.retry_limit, 2);
        assert_eq!(config.retry_delay, Duration::from_millis(150));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["retry_delay_ms"], 150);
    }

    #[test]
    fn test_serde_missing_fields_default() {
        let config: RetryConfig = serde_json::from_str(r#"{"retry_limit": 9}"#).unwrap();
        assert_eq!(config.retry_limit, 9);
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
    }
}
