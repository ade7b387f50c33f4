// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for per-item events.

use crate::errors::TaskError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Item admitted and handed to a worker.
///
/// # Log Level
/// `debug!`
pub struct TaskStarted {
    pub key: u64,
}

impl Display for TaskStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Starting item {}", self.key)
    }
}

impl StructuredLog for TaskStarted {
    fn log(&self) {
        tracing::debug!(key = self.key, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("task", span_name = name, key = self.key)
    }
}

/// Item succeeded.
///
/// # Log Level
/// `debug!`
pub struct TaskSucceeded {
    pub key: u64,
}

impl Display for TaskSucceeded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Item {} succeeded", self.key)
    }
}

impl StructuredLog for TaskSucceeded {
    fn log(&self) {
        tracing::debug!(key = self.key, "{}", self);
    }
}

/// Item reached a terminal failure.
///
/// # Log Level
/// `warn!` - Recorded as a failure; the batch continues unless the budget trips
///
/// # Example
/// ```
/// use the_conveyor::errors::TaskError;
/// use the_conveyor::observability::messages::task::TaskFailed;
///
/// let error = TaskError::Stopped;
/// let msg = TaskFailed { key: 4, error: &error };
///
/// assert_eq!(msg.to_string(), "Item 4 failed (stopped): task stopped before completion");
/// ```
pub struct TaskFailed<'a> {
    pub key: u64,
    pub error: &'a TaskError,
}

impl Display for TaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Item {} failed ({}): {}", self.key, self.error.kind(), self.error)
    }
}

impl StructuredLog for TaskFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            key = self.key,
            kind = %self.error.kind(),
            error = %self.error,
            "{}", self
        );
    }
}

/// A failed attempt is about to be retried.
///
/// # Log Level
/// `debug!`
pub struct TaskRetrying<'a> {
    pub key: u64,
    pub attempt: u32,
    pub error: &'a TaskError,
}

impl Display for TaskRetrying<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Retrying item {} (retry {}) after: {}",
            self.key, self.attempt, self.error
        )
    }
}

impl StructuredLog for TaskRetrying<'_> {
    fn log(&self) {
        tracing::debug!(
            key = self.key,
            attempt = self.attempt,
            error = %self.error,
            "{}", self
        );
    }
}

/// An attempt ran past the configured timeout.
///
/// # Log Level
/// `warn!`
pub struct TaskTimedOut {
    pub key: u64,
    pub timeout: Duration,
}

impl Display for TaskTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Item {} timed out after {:?}", self.key, self.timeout)
    }
}

impl StructuredLog for TaskTimedOut {
    fn log(&self) {
        tracing::warn!(
            key = self.key,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// Handler-reported progress.
///
/// # Log Level
/// `trace!`
pub struct TaskProgress<'a> {
    pub key: u64,
    pub progress: &'a serde_json::Value,
}

impl Display for TaskProgress<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Item {} progress: {}", self.key, self.progress)
    }
}

impl StructuredLog for TaskProgress<'_> {
    fn log(&self) {
        tracing::trace!(key = self.key, progress = %self.progress, "{}", self);
    }
}

/// Admission is waiting out the global pacing delay.
///
/// # Log Level
/// `debug!`
pub struct AdmissionDelayed {
    pub delay: Duration,
}

impl Display for AdmissionDelayed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Delaying next admission by {:?}", self.delay)
    }
}

impl StructuredLog for AdmissionDelayed {
    fn log(&self) {
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_failed_names_kind() {
        let error = TaskError::Timeout {
            after: Duration::from_millis(50),
        };
        let msg = TaskFailed { key: 9, error: &error };
        assert!(msg.to_string().starts_with("Item 9 failed (timeout)"));
    }

    #[test]
    fn test_progress_renders_json() {
        let progress = serde_json::json!({ "done": 3 });
        let msg = TaskProgress {
            key: 1,
            progress: &progress,
        };
        assert_eq!(msg.to_string(), r#"Item 1 progress: {"done":3}"#);
    }
}
