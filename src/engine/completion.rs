// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Settle-once completion signal for a whole batch.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{Notify, OnceCell};

use crate::engine::TaskOutcome;
use crate::errors::AbortReason;

/// Final settlement of a batch.
#[derive(Debug)]
pub enum BatchOutcome<R> {
    /// Every item was admitted and recorded. Results are ordered by key.
    Completed(Vec<TaskOutcome<R>>),
    /// The batch was aborted. Items that never finished are recorded as
    /// `Stopped`, so `partial` still holds one entry per admitted key (one per
    /// input item in bounded mode).
    Aborted {
        reason: AbortReason,
        partial: Vec<TaskOutcome<R>>,
    },
}

impl<R> BatchOutcome<R> {
    pub fn results(&self) -> &[TaskOutcome<R>] {
        match self {
            BatchOutcome::Completed(results) => results,
            BatchOutcome::Aborted { partial, .. } => partial,
        }
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        match self {
            BatchOutcome::Completed(_) => None,
            BatchOutcome::Aborted { reason, .. } => Some(reason),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BatchOutcome::Completed(_))
    }
}

/// Storage behind every clone of a [`CompletionSignal`].
pub(crate) struct Settlement<R> {
    outcome: OnceCell<Arc<BatchOutcome<R>>>,
    settled: Notify,
}

impl<R> Settlement<R> {
    pub(crate) fn new() -> Self {
        Self {
            outcome: OnceCell::new(),
            settled: Notify::new(),
        }
    }

    /// Store the outcome and wake every waiter. Only the first call has any effect.
    pub(crate) fn settle(&self, outcome: BatchOutcome<R>) -> bool {
        if self.outcome.set(Arc::new(outcome)).is_err() {
            return false;
        }
        self.settled.notify_waiters();
        true
    }

    pub(crate) fn get(&self) -> Option<Arc<BatchOutcome<R>>> {
        self.outcome.get().cloned()
    }
}

/// Future-like handle on a batch's settlement.
///
/// Clones share one settlement. Await the signal directly, or call
/// [`wait`](Self::wait) to keep the handle.
pub struct CompletionSignal<R> {
    settlement: Arc<Settlement<R>>,
}

impl<R> Clone for CompletionSignal<R> {
    fn clone(&self) -> Self {
        Self {
            settlement: Arc::clone(&self.settlement),
        }
    }
}

impl<R> fmt::Debug for CompletionSignal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSignal")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<R> CompletionSignal<R> {
    pub(crate) fn new(settlement: Arc<Settlement<R>>) -> Self {
        Self { settlement }
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.outcome.initialized()
    }

    /// The outcome if the batch has already settled.
    pub fn try_outcome(&self) -> Option<Arc<BatchOutcome<R>>> {
        self.settlement.get()
    }

    pub async fn wait(&self) -> Arc<BatchOutcome<R>> {
        loop {
            let notified = self.settlement.settled.notified();
            tokio::pin!(notified);
            // Register before checking so a settle between the check and the
            // await still wakes us.
            notified.as_mut().enable();

            if let Some(outcome) = self.settlement.get() {
                return outcome;
            }
            notified.await;
        }
    }
}

impl<R> IntoFuture for CompletionSignal<R>
where
    R: Send + Sync + 'static,
{
    type Output = Arc<BatchOutcome<R>>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}
