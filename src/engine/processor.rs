// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The public face of the engine.
//!
//! # Examples
//!
//! ## Bounded batch
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use the_conveyor::config::ProcessorOptions;
//! use the_conveyor::engine::{BatchProcessor, CancellationContext, WorkItem};
//! use the_conveyor::traits::{Handler, ProgressReporter};
//!
//! struct Double;
//!
//! #[async_trait]
//! impl Handler<u32, u32> for Double {
//!     async fn handle(
//!         &self,
//!         item: &WorkItem<u32>,
//!         _progress: &ProgressReporter,
//!         _cancel: &CancellationContext,
//!     ) -> anyhow::Result<u32> {
//!         Ok(item.payload * 2)
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ProcessorOptions::new()
//!     .with_concurrency(2)
//!     .with_delay(Duration::from_millis(5));
//! let handler: Arc<dyn Handler<u32, u32>> = Arc::new(Double);
//! let processor = BatchProcessor::new(handler, vec![1, 2, 3], options)?;
//!
//! let outcome = processor.start().await;
//! let doubled: Vec<u32> = outcome.results().iter().filter_map(|r| r.value().copied()).collect();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{validate_options, ProcessorOptions};
use crate::engine::completion::CompletionSignal;
use crate::engine::shared::{Mode, PoolCore};
use crate::engine::source::FixedSource;
use crate::engine::state::ProcessorSnapshot;
use crate::engine::{pool, streaming, RetryLimit};
use crate::errors::{AbortReason, ConfigurationError};
use crate::observability::messages::engine::{
    BatchStarted, LateConfigurationIgnored, ProcessorPaused, ProcessorResumed,
};
use crate::observability::messages::StructuredLog;
use crate::observability::TracingHooks;
use crate::traits::{Handler, ItemSource, ProcessorHooks};

/// Runs work items through a [`Handler`] with bounded concurrency, global
/// admission pacing, per-attempt timeout and retry, pause/resume and an
/// error budget.
///
/// Two modes share one engine:
///
/// * **Bounded** ([`new`](Self::new)): a fixed list of items, one result per
///   item in input order.
/// * **Streaming** ([`streaming`](Self::streaming)): items are pulled from an
///   [`ItemSource`] until it reports exhaustion; results are ordered by
///   admission key.
///
/// Nothing runs until [`start`](Self::start) is called.
pub struct BatchProcessor<T, R> {
    core: Arc<PoolCore<T, R>>,
    started: AtomicBool,
}

impl<T, R> BatchProcessor<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Bounded mode over `items`.
    pub fn new(
        handler: Arc<dyn Handler<T, R>>,
        items: Vec<T>,
        options: ProcessorOptions,
    ) -> Result<Self, ConfigurationError> {
        validate_options(&options)?;
        let capacity = items.len();
        Ok(Self::from_core(PoolCore::new(
            Mode::Bounded,
            handler,
            Arc::new(TracingHooks),
            options,
            Box::new(FixedSource::new(items)),
            Some(capacity),
        )))
    }

    /// Streaming mode over a pull source.
    pub fn streaming(
        handler: Arc<dyn Handler<T, R>>,
        source: impl ItemSource<T> + 'static,
        options: ProcessorOptions,
    ) -> Result<Self, ConfigurationError> {
        validate_options(&options)?;
        Ok(Self::from_core(PoolCore::new(
            Mode::Streaming,
            handler,
            Arc::new(TracingHooks),
            options,
            Box::new(source),
            None,
        )))
    }

    fn from_core(core: PoolCore<T, R>) -> Self {
        Self {
            core: Arc::new(core),
            started: AtomicBool::new(false),
        }
    }

    /// Replace the default [`TracingHooks`]. Has no effect once started.
    pub fn with_hooks(mut self, hooks: Arc<dyn ProcessorHooks<T, R>>) -> Self {
        match Arc::get_mut(&mut self.core) {
            Some(core) => core.hooks = hooks,
            None => LateConfigurationIgnored { setting: "hooks" }.log(),
        }
        self
    }

    /// Compute the retry limit per item instead of using `max_retries`.
    /// Has no effect once started.
    pub fn with_retry_policy<F>(mut self, policy: F) -> Self
    where
        F: Fn(&T, u64) -> u32 + Send + Sync + 'static,
    {
        match Arc::get_mut(&mut self.core) {
            Some(core) => core.retry_limit = RetryLimit::per_item(policy),
            None => LateConfigurationIgnored {
                setting: "retry_policy",
            }
            .log(),
        }
        self
    }

    /// Start processing and return the completion signal.
    ///
    /// Idempotent: a second call, or a call after an immediate stop, returns a
    /// signal on the same settlement without spawning anything.
    pub fn start(&self) -> CompletionSignal<R> {
        let signal = CompletionSignal::new(Arc::clone(&self.core.settlement));
        if self.core.state.is_settled() || self.core.is_stopping() {
            return signal;
        }
        if self.started.swap(true, Ordering::AcqRel) {
            return signal;
        }

        self.core.mark_started();
        BatchStarted {
            mode: self.core.mode.as_str(),
            concurrency: self.core.options.concurrency,
            item_count: self.core.expected_items,
        }
        .log();

        match self.core.mode {
            Mode::Bounded => pool::spawn_workers(&self.core),
            Mode::Streaming => streaming::spawn_driver(&self.core),
        }
        signal
    }

    /// `stop(false)` pauses admission; in-flight items keep running and
    /// [`resume`](Self::resume) picks up where admission left off.
    ///
    /// `stop(true)` cancels every in-flight context and every wait, then
    /// settles at once with partial results: items without an outcome are
    /// recorded as `Stopped`.
    pub fn stop(&self, immediate: bool) {
        if self.core.state.is_settled() {
            return;
        }

        if immediate {
            self.core.abort(AbortReason::StoppedByCaller);
            return;
        }

        if self.core.is_stopping() {
            return;
        }
        if self.core.gate.pause() {
            ProcessorPaused {
                generation: self.core.gate.generation(),
            }
            .log();
            self.core.hooks.on_paused();
        }
    }

    /// Reopen the gate after a graceful stop. An immediate stop cannot be resumed.
    pub fn resume(&self) {
        if self.core.is_stopping() || self.core.state.is_settled() {
            return;
        }
        if self.core.gate.resume() {
            ProcessorResumed {
                generation: self.core.gate.generation(),
            }
            .log();
            self.core.hooks.on_resumed();
        }
    }

    pub fn snapshot(&self) -> ProcessorSnapshot {
        self.core.snapshot()
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.core.options
    }
}
