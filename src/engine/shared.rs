// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! State and behaviour shared by every worker of one processor.
//!
//! Bounded and streaming mode differ only in who calls [`PoolCore::admit_next`]
//! and [`PoolCore::execute`]: N long-lived workers, or a single driver that
//! spawns one task per item. Everything below that point, from retries to
//! settlement, lives here.

use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::ProcessorOptions;
use crate::engine::admission::AdmissionQueue;
use crate::engine::budget::{BudgetCheck, ErrorBudget};
use crate::engine::cancellation::{CancelCause, InFlightRegistry};
use crate::engine::completion::{BatchOutcome, Settlement};
use crate::engine::gate::PauseGate;
use crate::engine::state::{ProcessorSnapshot, ProcessorState};
use crate::engine::{RetryLimit, TaskOutcome, WorkItem};
use crate::errors::{AbortReason, FailureKind, SourceError, TaskError};
use crate::observability::messages::engine::{
    BatchAborted, BatchCompleted, InFlightCancelled, OutcomeDiscarded,
};
use crate::observability::messages::task::TaskStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::{Handler, ItemSource, ProcessorHooks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Bounded,
    Streaming,
}

impl Mode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Mode::Bounded => "bounded",
            Mode::Streaming => "streaming",
        }
    }
}

pub(crate) struct PoolCore<T, R> {
    pub(crate) mode: Mode,
    pub(crate) handler: Arc<dyn Handler<T, R>>,
    pub(crate) hooks: Arc<dyn ProcessorHooks<T, R>>,
    pub(crate) retry_limit: RetryLimit<T>,
    pub(crate) options: ProcessorOptions,
    /// Known item count: the bounded list length, or the source's size hint.
    pub(crate) expected_items: Option<usize>,
    pub(crate) state: ProcessorState<R>,
    pub(crate) gate: PauseGate,
    pub(crate) budget: ErrorBudget,
    pub(crate) in_flight: InFlightRegistry,
    pub(crate) settlement: Arc<Settlement<R>>,
    /// Fired by immediate stop, and at settlement to release workers still
    /// parked behind the gate. Every wait in the engine selects on it.
    pub(crate) stop_token: CancellationToken,
    pub(crate) admission: AdmissionQueue<T>,
    /// One permit per finished task; the streaming driver sleeps on it.
    pub(crate) task_done: Notify,
    started_at: OnceLock<Instant>,
}

impl<T, R> PoolCore<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    pub(crate) fn new(
        mode: Mode,
        handler: Arc<dyn Handler<T, R>>,
        hooks: Arc<dyn ProcessorHooks<T, R>>,
        options: ProcessorOptions,
        source: Box<dyn ItemSource<T>>,
        capacity: Option<usize>,
    ) -> Self {
        let expected_items = capacity.or_else(|| source.size_hint());
        Self {
            mode,
            handler,
            hooks,
            retry_limit: RetryLimit::Fixed(options.max_retries),
            budget: ErrorBudget::new(options.max_total_errors),
            options,
            expected_items,
            state: ProcessorState::new(capacity),
            gate: PauseGate::new(),
            in_flight: InFlightRegistry::default(),
            settlement: Arc::new(Settlement::new()),
            stop_token: CancellationToken::new(),
            admission: AdmissionQueue::new(source),
            task_done: Notify::new(),
            started_at: OnceLock::new(),
        }
    }

    pub(crate) fn mark_started(&self) {
        let _ = self.started_at.set(Instant::now());
    }

    fn elapsed(&self) -> Duration {
        self.started_at
            .get()
            .map(Instant::elapsed)
            .unwrap_or_default()
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.state.is_immediate_stop()
    }

    /// `false` if immediate stop cut the sleep short.
    pub(crate) async fn sleep_unless_stopped(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.stop_token.cancelled() => false,
        }
    }

    pub(crate) async fn sleep_until_unless_stopped(&self, deadline: tokio::time::Instant) -> bool {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => true,
            _ = self.stop_token.cancelled() => false,
        }
    }

    /// Run one admitted item to its terminal outcome, record it and release
    /// its running slot.
    pub(crate) async fn execute(&self, item: WorkItem<T>) {
        let key = item.key;
        let span = TaskStarted { key }.span("execute");

        async {
            if !self.is_stopping() {
                self.hooks.on_task_start(&item);
            }
            let result = self.run_with_retry(&item).await;
            self.finish(key, result);
        }
        .instrument(span)
        .await;

        self.state.task_finished();
        self.task_done.notify_one();
        self.check_completion();
    }

    fn finish(&self, key: u64, result: Result<R, TaskError>) {
        if self.state.is_settled() {
            OutcomeDiscarded { key }.log();
            return;
        }

        let outcome = match result {
            Ok(value) => {
                self.hooks.on_task_finish(key, &value);
                TaskOutcome::Success(value)
            }
            Err(error) => {
                self.hooks.on_task_error(key, &error);
                TaskOutcome::Failure(error)
            }
        };

        let kind = outcome.failure_kind();
        if !self.state.record(key, outcome) {
            OutcomeDiscarded { key }.log();
            return;
        }

        // Stopped outcomes never count against the budget.
        if kind.is_none() || kind == Some(FailureKind::Stopped) {
            return;
        }
        if let BudgetCheck::Exceeded {
            total_errors,
            max_total_errors,
        } = self.budget.record_failure()
        {
            self.hooks.on_budget_exceeded(total_errors, max_total_errors);
            self.abort(AbortReason::ErrorBudgetExceeded {
                total_errors,
                max_total_errors,
            });
        }
    }

    /// Settle as completed once the source is exhausted and nothing runs.
    pub(crate) fn check_completion(&self) {
        if self.state.is_immediate_stop()
            || !self.state.is_exhausted()
            || self.state.running() > 0
        {
            return;
        }

        if let Some((results, _)) = self.state.take_for_settlement() {
            BatchCompleted {
                mode: self.mode.as_str(),
                item_count: results.len(),
                failed: results.iter().filter(|outcome| !outcome.is_success()).count(),
                duration: self.elapsed(),
            }
            .log();
            self.settlement.settle(BatchOutcome::Completed(results));
            self.stop_token.cancel();
        }
    }

    /// Immediate stop: cancel every wait and every in-flight context, then
    /// settle with partial results. Only the first caller has any effect.
    pub(crate) fn abort(&self, reason: AbortReason) {
        if !self.state.begin_immediate_stop() {
            return;
        }

        self.stop_token.cancel();
        let count = self.in_flight.cancel_all(CancelCause::Stopped);
        if count > 0 {
            InFlightCancelled { count }.log();
        }
        self.hooks.on_batch_stopped(&reason);

        if let Some((partial, stopped)) = self.state.take_for_settlement() {
            BatchAborted {
                mode: self.mode.as_str(),
                reason: &reason,
                recorded: partial.len() - stopped,
                stopped,
                duration: self.elapsed(),
            }
            .log();
            self.settlement.settle(BatchOutcome::Aborted { reason, partial });
        }
    }

    pub(crate) fn fail_source(&self, error: SourceError) {
        self.hooks.on_pull_error(&error);
        self.abort(AbortReason::SourceFailed(error));
    }

    pub(crate) fn snapshot(&self) -> ProcessorSnapshot {
        self.state
            .snapshot(self.budget.total(), self.gate.is_paused())
    }
}
