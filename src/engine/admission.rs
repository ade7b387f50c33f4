// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The admission sequencer: the single serialization point for pacing.
//!
//! Every admission, whether requested by a bounded-mode worker or the
//! streaming driver, goes through one `tokio::sync::Mutex`. Its FIFO fairness
//! gives strictly increasing keys in request order, and holding it across the
//! delay wait spaces successive admissions globally rather than per worker.

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::engine::shared::PoolCore;
use crate::engine::WorkItem;
use crate::traits::{ItemSource, Pull};

/// What one admission request produced.
#[derive(Debug)]
pub(crate) enum Admission<T> {
    Item(WorkItem<T>),
    /// The source is temporarily empty (streaming mode).
    Empty,
    /// The gate closed while the request waited; nothing was consumed.
    Deferred,
    /// No more items will be admitted: the source ran dry or the batch stopped.
    Exhausted,
}

pub(crate) struct AdmissionQueue<T> {
    inner: Mutex<QueueInner<T>>,
}

struct QueueInner<T> {
    source: Box<dyn ItemSource<T>>,
    next_key: u64,
    last_admission: Option<Instant>,
    exhausted: bool,
}

impl<T> AdmissionQueue<T> {
    pub(crate) fn new(source: Box<dyn ItemSource<T>>) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                source,
                next_key: 0,
                last_admission: None,
                exhausted: false,
            }),
        }
    }
}

impl<T, R> PoolCore<T, R>
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Admit the next item, waiting out the pacing delay first.
    ///
    /// The gate is checked both before and after the delay, so a pause that
    /// lands mid-wait defers the admission instead of consuming an item. An
    /// immediate stop during the delay or the pull admits nothing.
    pub(crate) async fn admit_next(&self) -> Admission<T> {
        let mut queue = self.admission.inner.lock().await;
        if self.is_stopping() || queue.exhausted {
            return Admission::Exhausted;
        }
        if self.gate.is_paused() {
            return Admission::Deferred;
        }
        if queue.source.is_exhausted() {
            queue.exhausted = true;
            self.state.mark_exhausted();
            return Admission::Exhausted;
        }

        let delay = self.options.delay;
        if let Some(last) = queue.last_admission.filter(|_| !delay.is_zero()) {
            let deadline = last + delay;
            self.hooks
                .on_delay(deadline.saturating_duration_since(Instant::now()));
            if !self.sleep_until_unless_stopped(deadline).await || self.is_stopping() {
                return Admission::Exhausted;
            }
            if self.gate.is_paused() {
                return Admission::Deferred;
            }
        }

        match queue.source.pull_next().await {
            Ok(Pull::Item(payload)) => {
                // An immediate stop may have landed during the pull.
                if !self.state.try_admit() {
                    return Admission::Exhausted;
                }
                let key = queue.next_key;
                queue.next_key += 1;
                queue.last_admission = Some(Instant::now());
                if queue.source.is_exhausted() {
                    // Lets the last task settle the batch even if every
                    // worker is parked behind a closed gate.
                    queue.exhausted = true;
                    self.state.mark_exhausted();
                }
                Admission::Item(WorkItem { key, payload })
            }
            Ok(Pull::Empty) => Admission::Empty,
            Ok(Pull::Exhausted) => {
                queue.exhausted = true;
                self.state.mark_exhausted();
                Admission::Exhausted
            }
            Err(error) => {
                queue.exhausted = true;
                drop(queue);
                if self.is_stopping() {
                    return Admission::Exhausted;
                }
                self.fail_source(error);
                Admission::Exhausted
            }
        }
    }
}
