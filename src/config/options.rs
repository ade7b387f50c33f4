// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_CONCURRENCY, DEFAULT_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for a [`BatchProcessor`](crate::engine::BatchProcessor).
///
/// Every field is optional in configuration files. Durations are written as
/// integer milliseconds, and a zero duration disables the behaviour it controls.
///
/// # Example
/// ```yaml
/// concurrency: 4
/// delay_ms: 100        # minimum spacing between admissions, global
/// timeout_ms: 2000     # per attempt, 0 = no timeout
/// retry_delay_ms: 250
/// max_retries: 2       # 0 = a single attempt
/// max_total_errors: 10 # omit for an unbounded budget
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorOptions {
    pub concurrency: usize,
    #[serde(rename = "delay_ms", with = "duration_millis")]
    pub delay: Duration,
    #[serde(rename = "timeout_ms", with = "duration_millis")]
    pub timeout: Duration,
    #[serde(rename = "retry_delay_ms", with = "duration_millis")]
    pub retry_delay: Duration,
    pub max_retries: u32,
    pub max_total_errors: Option<usize>,
    /// Streaming mode only: how long to sleep after the source reports it is
    /// temporarily empty.
    #[serde(rename = "poll_interval_ms", with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            delay: Duration::ZERO,
            timeout: Duration::ZERO,
            retry_delay: Duration::ZERO,
            max_retries: 0,
            max_total_errors: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ProcessorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_total_errors(mut self, max_total_errors: usize) -> Self {
        self.max_total_errors = Some(max_total_errors);
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Serde support for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProcessorOptions::default();
        assert_eq!(options.concurrency, 1);
        assert_eq!(options.delay, Duration::ZERO);
        assert_eq!(options.timeout, Duration::ZERO);
        assert_eq!(options.retry_delay, Duration::ZERO);
        assert_eq!(options.max_retries, 0);
        assert_eq!(options.max_total_errors, None);
        assert_eq!(options.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_partial_yaml_uses_defaults_for_missing_fields() {
        let yaml = r#"
concurrency: 3
timeout_ms: 1500
max_total_errors: 4
"#;
        let options: ProcessorOptions = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(options.concurrency, 3);
        assert_eq!(options.timeout, Duration::from_millis(1500));
        assert_eq!(options.max_total_errors, Some(4));
        assert_eq!(options.delay, Duration::ZERO);
        assert_eq!(options.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_builder_setters() {
        let options = ProcessorOptions::new()
            .with_concurrency(8)
            .with_delay(Duration::from_millis(20))
            .with_max_retries(3)
            .with_max_total_errors(2);

        assert_eq!(options.concurrency, 8);
        assert_eq!(options.delay, Duration::from_millis(20));
        assert_eq!(options.max_retries, 3);
        assert_eq!(options.max_total_errors, Some(2));
    }
}
