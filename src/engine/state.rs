// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared mutable state of one processor.
//!
//! Counters and flags are atomics. The result slots and the `settled` flag
//! share one mutex, so that taking the results for settlement and writing a
//! late outcome can never interleave.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::engine::TaskOutcome;
use crate::errors::TaskError;

/// Point-in-time view of a processor, for progress displays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorSnapshot {
    /// Items admitted so far (equals the next key to assign).
    pub admitted: u64,
    pub running: usize,
    /// Outcomes recorded by finished tasks.
    pub recorded: usize,
    pub total_errors: usize,
    pub paused: bool,
    pub immediate_stop: bool,
    pub settled: bool,
}

pub(crate) struct ProcessorState<R> {
    admitted: AtomicU64,
    running: AtomicUsize,
    immediate_stop: AtomicBool,
    exhausted: AtomicBool,
    settled: AtomicBool,
    results: Mutex<ResultSlots<R>>,
}

struct ResultSlots<R> {
    slots: Vec<Option<TaskOutcome<R>>>,
    recorded: usize,
}

impl<R> ProcessorState<R> {
    /// `capacity` pre-sizes the result set (bounded mode). Streaming mode
    /// passes `None` and the set grows as keys are recorded.
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        let mut slots = Vec::new();
        if let Some(capacity) = capacity {
            slots.resize_with(capacity, || None);
        }

        Self {
            admitted: AtomicU64::new(0),
            running: AtomicUsize::new(0),
            immediate_stop: AtomicBool::new(false),
            exhausted: AtomicBool::new(false),
            settled: AtomicBool::new(false),
            results: Mutex::new(ResultSlots { slots, recorded: 0 }),
        }
    }

    /// Count a freshly pulled item as admitted and running. Called inside the
    /// admission critical section, so "exhausted and nothing running" is never
    /// observed while an admitted item is still on its way to a worker.
    ///
    /// Returns `false`, admitting nothing, once immediate stop was raised or
    /// the batch settled. Holding the results lock orders this against
    /// [`take_for_settlement`](Self::take_for_settlement): every key admitted
    /// here gets a slot in the settled results.
    pub(crate) fn try_admit(&self) -> bool {
        let _results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_immediate_stop() || self.is_settled() {
            return false;
        }
        self.admitted.fetch_add(1, Ordering::AcqRel);
        self.running.fetch_add(1, Ordering::SeqCst);
        true
    }

    pub(crate) fn task_finished(&self) {
        let previous = self.running.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "running count underflow");
    }

    // `running` and `exhausted` are written by different tasks and read
    // together by the completion check, so both sides use SeqCst.
    pub(crate) fn running(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_exhausted(&self) {
        self.exhausted.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::SeqCst)
    }

    /// Raise the immediate-stop flag. Returns `true` for the caller that
    /// actually flipped it.
    pub(crate) fn begin_immediate_stop(&self) -> bool {
        !self.immediate_stop.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn is_immediate_stop(&self) -> bool {
        self.immediate_stop.load(Ordering::Acquire)
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }

    /// Write the outcome for `key`. Returns `false`, and drops the outcome, if
    /// the batch has settled or the key already has one.
    pub(crate) fn record(&self, key: u64, outcome: TaskOutcome<R>) -> bool {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_settled() {
            return false;
        }

        let index = key as usize;
        if index >= results.slots.len() {
            results.slots.resize_with(index + 1, || None);
        }
        if results.slots[index].is_some() {
            return false;
        }

        results.slots[index] = Some(outcome);
        results.recorded += 1;
        true
    }

    /// Flip `settled` and hand back the ordered results. Slots with no
    /// outcome become `Stopped`, and every admitted key gets a slot. Returns
    /// `None` if already settled, so exactly one caller ever gets the results.
    pub(crate) fn take_for_settlement(&self) -> Option<(Vec<TaskOutcome<R>>, usize)> {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if self.settled.swap(true, Ordering::AcqRel) {
            return None;
        }

        let admitted = self.admitted.load(Ordering::Acquire) as usize;
        if results.slots.len() < admitted {
            results.slots.resize_with(admitted, || None);
        }

        let mut stopped = 0;
        let outcomes = std::mem::take(&mut results.slots)
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    stopped += 1;
                    TaskOutcome::Failure(TaskError::Stopped)
                })
            })
            .collect();
        Some((outcomes, stopped))
    }

    pub(crate) fn snapshot(&self, total_errors: usize, paused: bool) -> ProcessorSnapshot {
        let recorded = self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recorded;
        ProcessorSnapshot {
            admitted: self.admitted.load(Ordering::Acquire),
            running: self.running(),
            recorded,
            total_errors,
            paused,
            immediate_stop: self.is_immediate_stop(),
            settled: self.is_settled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;

    #[test]
    fn test_each_key_is_written_once() {
        let state = ProcessorState::<u32>::new(Some(2));
        assert!(state.record(1, TaskOutcome::Success(10)));
        assert!(!state.record(1, TaskOutcome::Success(11)));

        let (results, stopped) = state.take_for_settlement().unwrap();
        assert_eq!(stopped, 1);
        assert_eq!(results[0].failure_kind(), Some(FailureKind::Stopped));
        assert_eq!(results[1].value(), Some(&10));
    }

    #[test]
    fn test_streaming_slots_grow() {
        let state = ProcessorState::<&str>::new(None);
        assert!(state.record(2, TaskOutcome::Success("c")));
        assert!(state.record(0, TaskOutcome::Success("a")));
        assert!(state.record(1, TaskOutcome::Success("b")));

        let (results, stopped) = state.take_for_settlement().unwrap();
        assert_eq!(stopped, 0);
        let values: Vec<_> = results.iter().filter_map(|r| r.value().copied()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_admitted_keys_without_outcome_are_stopped() {
        let state = ProcessorState::<u32>::new(None);
        assert!(state.try_admit());
        assert!(state.try_admit());
        assert!(state.try_admit());
        assert!(state.record(0, TaskOutcome::Success(7)));

        let (results, stopped) = state.take_for_settlement().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(stopped, 2);
        assert_eq!(results[2].failure_kind(), Some(FailureKind::Stopped));
    }

    #[test]
    fn test_settlement_is_taken_once_and_gates_writes() {
        let state = ProcessorState::<u32>::new(Some(1));
        assert!(state.take_for_settlement().is_some());
        assert!(state.take_for_settlement().is_none());
        assert!(!state.record(0, TaskOutcome::Success(1)));
        assert!(state.is_settled());
    }

    #[test]
    fn test_admission_tracks_running() {
        let state = ProcessorState::<u32>::new(None);
        assert!(state.try_admit());
        assert!(state.try_admit());
        state.task_finished();

        let snapshot = state.snapshot(0, false);
        assert_eq!(snapshot.admitted, 2);
        assert_eq!(snapshot.running, 1);
        assert!(state.begin_immediate_stop());
        assert!(!state.begin_immediate_stop());
    }

    #[test]
    fn test_nothing_is_admitted_after_immediate_stop() {
        let state = ProcessorState::<u32>::new(None);
        assert!(state.try_admit());
        assert!(state.begin_immediate_stop());
        assert!(!state.try_admit());

        let (results, stopped) = state.take_for_settlement().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(stopped, 1);
        assert_eq!(state.snapshot(0, false).running, 1);
    }

    #[test]
    fn test_nothing_is_admitted_after_settlement() {
        let state = ProcessorState::<u32>::new(None);
        assert!(state.take_for_settlement().is_some());
        assert!(!state.try_admit());
        assert_eq!(state.snapshot(0, false).admitted, 0);
    }
}
