// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Streaming mode: one driver pulls from the source and spawns a task per item.
//!
//! The driver keeps `running` topped up to `concurrency`, then sleeps until a
//! task finishes. When the source reports it is temporarily empty the driver
//! also wakes after `poll_interval` to pull again.

use std::sync::Arc;
use tracing::Instrument;

use crate::engine::admission::Admission;
use crate::engine::shared::PoolCore;
use crate::observability::messages::engine::{WorkerFinished, WorkerStarted};
use crate::observability::messages::StructuredLog;

const DRIVER_ID: usize = 0;

pub(crate) fn spawn_driver<T, R>(core: &Arc<PoolCore<T, R>>)
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    let core = Arc::clone(core);
    let span = WorkerStarted {
        worker_id: DRIVER_ID,
    }
    .span("stream_driver");
    tokio::spawn(drive(core).instrument(span));
}

async fn drive<T, R>(core: Arc<PoolCore<T, R>>)
where
    T: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    WorkerStarted {
        worker_id: DRIVER_ID,
    }
    .log();

    'driver: loop {
        if core.is_stopping() || core.state.is_settled() {
            break;
        }
        if !core.gate.wait_if_paused(&core.stop_token).await {
            break;
        }

        let mut idle = false;
        while !core.state.is_exhausted()
            && !core.is_stopping()
            && core.state.running() < core.options.concurrency
        {
            match core.admit_next().await {
                Admission::Item(item) => {
                    let core = Arc::clone(&core);
                    tokio::spawn(async move { core.execute(item).await }.in_current_span());
                }
                Admission::Empty => {
                    idle = true;
                    break;
                }
                Admission::Deferred => continue 'driver,
                Admission::Exhausted => break,
            }
        }

        core.check_completion();
        if core.state.is_settled() || core.state.is_exhausted() || core.is_stopping() {
            // Spawned tasks settle the batch themselves once the last one ends.
            break;
        }

        tokio::select! {
            _ = core.task_done.notified() => {}
            _ = tokio::time::sleep(core.options.poll_interval), if idle => {}
            _ = core.stop_token.cancelled() => break,
        }
    }

    WorkerFinished {
        worker_id: DRIVER_ID,
    }
    .log();
}
