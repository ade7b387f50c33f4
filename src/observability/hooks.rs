// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::engine::WorkItem;
use crate::errors::{AbortReason, SourceError, TaskError};
use crate::observability::messages::engine::{BatchStopping, ErrorBudgetExceeded, SourcePullFailed};
use crate::observability::messages::task::{
    AdmissionDelayed, TaskFailed, TaskProgress, TaskRetrying, TaskStarted, TaskSucceeded,
    TaskTimedOut,
};
use crate::observability::messages::StructuredLog;
use crate::traits::ProcessorHooks;

/// Default hooks: every notification becomes a structured `tracing` event.
///
/// Pause and resume are logged by the processor itself, which knows the gate
/// generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHooks;

impl<T, R> ProcessorHooks<T, R> for TracingHooks {
    fn on_task_start(&self, item: &WorkItem<T>) {
        TaskStarted { key: item.key }.log();
    }

    fn on_task_finish(&self, key: u64, _value: &R) {
        TaskSucceeded { key }.log();
    }

    fn on_task_error(&self, key: u64, error: &TaskError) {
        TaskFailed { key, error }.log();
    }

    fn on_task_retry(&self, key: u64, attempt: u32, error: &TaskError) {
        TaskRetrying {
            key,
            attempt,
            error,
        }
        .log();
    }

    fn on_task_timeout(&self, key: u64, timeout: Duration) {
        TaskTimedOut { key, timeout }.log();
    }

    fn on_task_progress(&self, key: u64, progress: &serde_json::Value) {
        TaskProgress { key, progress }.log();
    }

    fn on_delay(&self, delay: Duration) {
        AdmissionDelayed { delay }.log();
    }

    fn on_batch_stopped(&self, reason: &AbortReason) {
        BatchStopping { reason }.log();
    }

    fn on_budget_exceeded(&self, total_errors: usize, max_total_errors: usize) {
        ErrorBudgetExceeded {
            total_errors,
            max_total_errors,
        }
        .log();
    }

    fn on_pull_error(&self, error: &SourceError) {
        SourcePullFailed { error }.log();
    }
}
