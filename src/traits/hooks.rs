use std::time::Duration;

use crate::engine::WorkItem;
use crate::errors::{AbortReason, SourceError, TaskError};

/// Notification points observed by a collaborator.
///
/// Every method has an empty default body, so implementors pick only the
/// events they care about. Hooks are invoked synchronously from the worker
/// that produced the event and must not block.
pub trait ProcessorHooks<T, R>: Send + Sync {
    fn on_task_start(&self, _item: &WorkItem<T>) {}

    fn on_task_finish(&self, _key: u64, _value: &R) {}

    /// Terminal failure of an item. `error.kind()` gives the classification.
    fn on_task_error(&self, _key: u64, _error: &TaskError) {}

    /// Fired before attempt `attempt` (1-based count of retries) starts.
    fn on_task_retry(&self, _key: u64, _attempt: u32, _error: &TaskError) {}

    fn on_task_timeout(&self, _key: u64, _timeout: Duration) {}

    fn on_task_progress(&self, _key: u64, _progress: &serde_json::Value) {}

    /// Fired before every admission after the first while a delay is set.
    /// `delay` is the remaining wait, zero if the previous admission is old enough.
    fn on_delay(&self, _delay: Duration) {}

    fn on_paused(&self) {}

    fn on_resumed(&self) {}

    fn on_batch_stopped(&self, _reason: &AbortReason) {}

    fn on_budget_exceeded(&self, _total_errors: usize, _max_total_errors: usize) {}

    fn on_pull_error(&self, _error: &SourceError) {}
}

/// Hooks that observe nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl<T, R> ProcessorHooks<T, R> for NoopHooks {}
