// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for batch and worker lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Batch start and settlement (completed or aborted)
//! * Worker loop start and exit
//! * Pause/resume transitions
//! * Error budget and source failures

use crate::errors::{AbortReason, SourceError};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Batch started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::engine::BatchStarted;
///
/// let msg = BatchStarted {
///     mode: "streaming",
///     concurrency: 8,
///     item_count: None,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct BatchStarted<'a> {
    pub mode: &'a str,
    pub concurrency: usize,
    /// `None` for streaming sources.
    pub item_count: Option<usize>,
}

impl Display for BatchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.item_count {
            Some(count) => write!(
                f,
                "Starting {} batch: {} items, concurrency={}",
                self.mode, count, self.concurrency
            ),
            None => write!(
                f,
                "Starting {} batch: unbounded source, concurrency={}",
                self.mode, self.concurrency
            ),
        }
    }
}

impl StructuredLog for BatchStarted<'_> {
    fn log(&self) {
        tracing::info!(
            mode = self.mode,
            concurrency = self.concurrency,
            item_count = ?self.item_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "batch",
            span_name = name,
            mode = self.mode,
            concurrency = self.concurrency,
        )
    }
}

/// Batch completed with every item recorded.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::engine::BatchCompleted;
/// use std::time::Duration;
///
/// let msg = BatchCompleted {
///     mode: "bounded",
///     item_count: 10,
///     failed: 1,
///     duration: Duration::from_millis(420),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct BatchCompleted<'a> {
    pub mode: &'a str,
    pub item_count: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Display for BatchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} batch completed: {} items ({} failed) in {:?}",
            self.mode, self.item_count, self.failed, self.duration
        )
    }
}

impl StructuredLog for BatchCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            mode = self.mode,
            item_count = self.item_count,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Batch settled early with partial results.
///
/// # Log Level
/// `warn!` - The caller gets partial results
pub struct BatchAborted<'a> {
    pub mode: &'a str,
    pub reason: &'a AbortReason,
    pub recorded: usize,
    /// Items that received a synthetic `Stopped` outcome.
    pub stopped: usize,
    pub duration: Duration,
}

impl Display for BatchAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} batch aborted after {:?}: {} ({} results, {} stopped)",
            self.mode, self.duration, self.reason, self.recorded, self.stopped
        )
    }
}

impl StructuredLog for BatchAborted<'_> {
    fn log(&self) {
        tracing::warn!(
            mode = self.mode,
            reason = %self.reason,
            recorded = self.recorded,
            stopped = self.stopped,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Immediate stop cancelled the contexts of running attempts.
///
/// # Log Level
/// `info!`
pub struct InFlightCancelled {
    pub count: usize,
}

impl Display for InFlightCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cancelled {} in-flight task attempts", self.count)
    }
}

impl StructuredLog for InFlightCancelled {
    fn log(&self) {
        tracing::info!(count = self.count, "{}", self);
    }
}

/// Worker loop entered.
///
/// # Log Level
/// `debug!`
pub struct WorkerStarted {
    pub worker_id: usize,
}

impl Display for WorkerStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} started", self.worker_id)
    }
}

impl StructuredLog for WorkerStarted {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker", span_name = name, worker_id = self.worker_id)
    }
}

/// Worker loop exited.
///
/// # Log Level
/// `debug!`
pub struct WorkerFinished {
    pub worker_id: usize,
}

impl Display for WorkerFinished {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} finished", self.worker_id)
    }
}

impl StructuredLog for WorkerFinished {
    fn log(&self) {
        tracing::debug!(worker_id = self.worker_id, "{}", self);
    }
}

/// An attempt finished after its batch settled; its outcome was dropped.
///
/// # Log Level
/// `debug!`
pub struct OutcomeDiscarded {
    pub key: u64,
}

impl Display for OutcomeDiscarded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Discarded late outcome for item {} (batch already settled)", self.key)
    }
}

impl StructuredLog for OutcomeDiscarded {
    fn log(&self) {
        tracing::debug!(key = self.key, "{}", self);
    }
}

/// Gate closed by a graceful stop.
///
/// # Log Level
/// `info!`
pub struct ProcessorPaused {
    pub generation: u64,
}

impl Display for ProcessorPaused {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processor paused (generation {})", self.generation)
    }
}

impl StructuredLog for ProcessorPaused {
    fn log(&self) {
        tracing::info!(generation = self.generation, "{}", self);
    }
}

/// Gate reopened.
///
/// # Log Level
/// `info!`
pub struct ProcessorResumed {
    pub generation: u64,
}

impl Display for ProcessorResumed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Processor resumed (generation {})", self.generation)
    }
}

impl StructuredLog for ProcessorResumed {
    fn log(&self) {
        tracing::info!(generation = self.generation, "{}", self);
    }
}

/// Immediate stop requested.
///
/// # Log Level
/// `warn!`
pub struct BatchStopping<'a> {
    pub reason: &'a AbortReason,
}

impl Display for BatchStopping<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stopping batch immediately: {}", self.reason)
    }
}

impl StructuredLog for BatchStopping<'_> {
    fn log(&self) {
        tracing::warn!(reason = %self.reason, "{}", self);
    }
}

/// A builder method was called after the processor started.
///
/// # Log Level
/// `warn!`
pub struct LateConfigurationIgnored<'a> {
    pub setting: &'a str,
}

impl Display for LateConfigurationIgnored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring {} change: processor already started", self.setting)
    }
}

impl StructuredLog for LateConfigurationIgnored<'_> {
    fn log(&self) {
        tracing::warn!(setting = self.setting, "{}", self);
    }
}

/// Terminal failures reached the configured ceiling.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_conveyor::observability::messages::engine::ErrorBudgetExceeded;
///
/// let msg = ErrorBudgetExceeded {
///     total_errors: 5,
///     max_total_errors: 5,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ErrorBudgetExceeded {
    pub total_errors: usize,
    pub max_total_errors: usize,
}

impl Display for ErrorBudgetExceeded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error budget exceeded: {} terminal failures (limit {})",
            self.total_errors, self.max_total_errors
        )
    }
}

impl StructuredLog for ErrorBudgetExceeded {
    fn log(&self) {
        tracing::error!(
            total_errors = self.total_errors,
            max_total_errors = self.max_total_errors,
            "{}", self
        );
    }
}

/// Streaming source failed to produce its next item.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct SourcePullFailed<'a> {
    pub error: &'a SourceError,
}

impl Display for SourcePullFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pull from item source failed: {}", self.error)
    }
}

impl StructuredLog for SourcePullFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_started_display() {
        let bounded = BatchStarted {
            mode: "bounded",
            concurrency: 2,
            item_count: Some(4),
        };
        assert_eq!(
            bounded.to_string(),
            "Starting bounded batch: 4 items, concurrency=2"
        );

        let streaming = BatchStarted {
            mode: "streaming",
            concurrency: 3,
            item_count: None,
        };
        assert!(streaming.to_string().contains("unbounded source"));
    }

    #[test]
    fn test_batch_aborted_display_includes_reason() {
        let reason = AbortReason::ErrorBudgetExceeded {
            total_errors: 2,
            max_total_errors: 2,
        };
        let msg = BatchAborted {
            mode: "bounded",
            reason: &reason,
            recorded: 5,
            stopped: 3,
            duration: Duration::from_millis(12),
        };
        let text = msg.to_string();
        assert!(text.contains("error budget exceeded"));
        assert!(text.contains("3 stopped"));
    }
}
