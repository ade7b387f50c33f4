// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Retry and timeout wrapper around a single item.
//!
//! Attempts are numbered `0..=max_retries`, so a limit of zero means exactly
//! one attempt. Every attempt gets a fresh [`CancellationContext`] and races
//! the handler against three things, checked in this order:
//!
//! 1. cancellation of the context (immediate stop) => `Stopped`
//! 2. the handler itself => success or `ApplicationError`
//! 3. the per-attempt timeout, when non-zero => `Timeout`
//!
//! The losing handler future is dropped. A handler that ignores its context is
//! still free to keep resources busy in spawned work of its own.

use std::fmt;
use std::sync::Arc;

use crate::engine::cancellation::{CancelCause, CancellationContext};
use crate::engine::shared::PoolCore;
use crate::engine::WorkItem;
use crate::errors::TaskError;
use crate::traits::ProgressReporter;

/// How many retries an item gets after its first attempt.
pub enum RetryLimit<T> {
    Fixed(u32),
    /// Computed from the payload and key when the item starts.
    PerItem(Arc<dyn Fn(&T, u64) -> u32 + Send + Sync>),
}

impl<T> RetryLimit<T> {
    pub fn per_item<F>(policy: F) -> Self
    where
        F: Fn(&T, u64) -> u32 + Send + Sync + 'static,
    {
        RetryLimit::PerItem(Arc::new(policy))
    }

    pub fn max_retries(&self, item: &WorkItem<T>) -> u32 {
        match self {
            RetryLimit::Fixed(limit) => *limit,
            RetryLimit::PerItem(policy) => policy(&item.payload, item.key),
        }
    }
}

impl<T> Clone for RetryLimit<T> {
    fn clone(&self) -> Self {
        match self {
            RetryLimit::Fixed(limit) => RetryLimit::Fixed(*limit),
            RetryLimit::PerItem(policy) => RetryLimit::PerItem(Arc::clone(policy)),
        }
    }
}

impl<T> fmt::Debug for RetryLimit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryLimit::Fixed(limit) => f.debug_tuple("Fixed").field(limit).finish(),
            RetryLimit::PerItem(_) => f.write_str("PerItem(..)"),
        }
    }
}

impl<T, R> PoolCore<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    pub(crate) async fn run_with_retry(&self, item: &WorkItem<T>) -> Result<R, TaskError> {
        let max_retries = self.retry_limit.max_retries(item);
        let mut last_error = TaskError::Stopped;

        for attempt in 0..=max_retries {
            if self.is_stopping() {
                return Err(TaskError::Stopped);
            }

            if attempt > 0 {
                self.hooks.on_task_retry(item.key, attempt, &last_error);
                let retry_delay = self.options.retry_delay;
                if !retry_delay.is_zero() && !self.sleep_unless_stopped(retry_delay).await {
                    return Err(TaskError::Stopped);
                }
            }

            match self.run_attempt(item).await {
                Ok(value) => return Ok(value),
                // Nothing left to retry into once the batch is stopping.
                Err(TaskError::Stopped) => return Err(TaskError::Stopped),
                Err(error) => last_error = error,
            }
        }

        Err(last_error)
    }

    async fn run_attempt(&self, item: &WorkItem<T>) -> Result<R, TaskError> {
        let key = item.key;
        let cancel = CancellationContext::new();
        self.in_flight.register(key, cancel.clone());

        let hooks = Arc::clone(&self.hooks);
        let progress = ProgressReporter::new(
            key,
            Arc::new(move |key: u64, value: &serde_json::Value| {
                hooks.on_task_progress(key, value)
            }),
        );

        let timeout = self.options.timeout;
        let result = tokio::select! {
            biased;

            _ = cancel.cancelled() => Err(TaskError::Stopped),
            handled = self.handler.handle(item, &progress, &cancel) => {
                handled.map_err(TaskError::application)
            }
            _ = tokio::time::sleep(timeout), if !timeout.is_zero() => {
                cancel.cancel(CancelCause::Timeout);
                self.hooks.on_task_timeout(key, timeout);
                Err(TaskError::Timeout { after: timeout })
            }
        };

        self.in_flight.release(key);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_limit_ignores_item() {
        let limit = RetryLimit::<&str>::Fixed(3);
        let item = WorkItem {
            key: 0,
            payload: "anything",
        };
        assert_eq!(limit.max_retries(&item), 3);
    }

    #[test]
    fn test_per_item_limit_sees_payload_and_key() {
        let limit = RetryLimit::<String>::per_item(|payload, key| {
            if payload.starts_with("flaky") {
                5
            } else {
                key as u32
            }
        });

        let flaky = WorkItem {
            key: 1,
            payload: "flaky-upload".to_string(),
        };
        let plain = WorkItem {
            key: 2,
            payload: "plain".to_string(),
        };
        assert_eq!(limit.max_retries(&flaky), 5);
        assert_eq!(limit.max_retries(&plain), 2);
        assert_eq!(format!("{:?}", limit.clone()), "PerItem(..)");
    }
}
