// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded mode: `concurrency` long-lived workers over one admission queue.
//!
//! Each worker loops wait-if-paused, admit, execute until the source is
//! exhausted or the batch stops. Concurrency is bounded by the worker count
//! itself, so no semaphore is involved.

use std::sync::Arc;
use tracing::Instrument;

use crate::engine::admission::Admission;
use crate::engine::shared::PoolCore;
use crate::observability::messages::engine::{WorkerFinished, WorkerStarted};
use crate::observability::messages::StructuredLog;

pub(crate) fn spawn_workers<T, R>(core: &Arc<PoolCore<T, R>>)
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    for worker_id in 0..core.options.concurrency {
        let core = Arc::clone(core);
        let span = WorkerStarted { worker_id }.span("run_worker");
        tokio::spawn(run_worker(core, worker_id).instrument(span));
    }
}

async fn run_worker<T, R>(core: Arc<PoolCore<T, R>>, worker_id: usize)
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    WorkerStarted { worker_id }.log();

    loop {
        if core.is_stopping() || core.state.is_settled() {
            break;
        }
        if !core.gate.wait_if_paused(&core.stop_token).await {
            break;
        }

        match core.admit_next().await {
            Admission::Item(item) => core.execute(item).await,
            Admission::Deferred => continue,
            Admission::Empty => {
                // Only reachable with a source that can run temporarily dry.
                if !core.sleep_unless_stopped(core.options.poll_interval).await {
                    break;
                }
            }
            Admission::Exhausted => break,
        }
    }

    core.check_completion();
    WorkerFinished { worker_id }.log();
}
