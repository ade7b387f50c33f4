// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pause/resume gate shared by every worker loop.
//!
//! The gate state lives in a `watch` channel, so a worker that subscribes
//! after `resume` already ran still sees the released state. No wakeup can be
//! lost between "check paused" and "park". Every resume bumps a generation
//! counter that is logged with the pause/resume events.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GateState {
    paused: bool,
    generation: u64,
}

#[derive(Debug)]
pub(crate) struct PauseGate {
    state: watch::Sender<GateState>,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    pub(crate) fn new() -> Self {
        let (state, _) = watch::channel(GateState::default());
        Self { state }
    }

    /// Close the gate. Returns `true` only on the open→closed edge.
    pub(crate) fn pause(&self) -> bool {
        self.state.send_if_modified(|state| {
            if state.paused {
                return false;
            }
            state.paused = true;
            true
        })
    }

    /// Open the gate and release every parked worker at once. Returns `true`
    /// only on the closed→open edge.
    pub(crate) fn resume(&self) -> bool {
        self.state.send_if_modified(|state| {
            if !state.paused {
                return false;
            }
            state.paused = false;
            state.generation += 1;
            true
        })
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    pub(crate) fn generation(&self) -> u64 {
        self.state.borrow().generation
    }

    /// Park while the gate is closed.
    ///
    /// Returns `false` if `stop` fired while parked, `true` once the gate is open.
    pub(crate) async fn wait_if_paused(&self, stop: &CancellationToken) -> bool {
        let mut state = self.state.subscribe();
        loop {
            if !state.borrow_and_update().paused {
                return true;
            }
            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
                _ = stop.cancelled() => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_pause_and_resume_report_edges_only() {
        let gate = PauseGate::new();

        assert!(!gate.resume());
        assert!(gate.pause());
        assert!(!gate.pause());
        assert!(gate.is_paused());

        assert!(gate.resume());
        assert!(!gate.resume());
        assert!(!gate.is_paused());
        assert_eq!(gate.generation(), 1);
    }

    #[tokio::test]
    async fn test_open_gate_does_not_block() {
        let gate = PauseGate::new();
        let stop = CancellationToken::new();
        assert!(gate.wait_if_paused(&stop).await);
    }

    #[tokio::test]
    async fn test_resume_releases_all_parked_waiters() {
        let gate = Arc::new(PauseGate::new());
        let stop = CancellationToken::new();
        gate.pause();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let gate = gate.clone();
            let stop = stop.clone();
            handles.push(tokio::spawn(async move { gate.wait_if_paused(&stop).await }));
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(handles.iter().all(|h| !h.is_finished()));

        gate.resume();
        for handle in handles {
            let released = tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .expect("waiter should be released")
                .unwrap();
            assert!(released);
        }
    }

    #[tokio::test]
    async fn test_stop_interrupts_parked_waiter() {
        let gate = Arc::new(PauseGate::new());
        let stop = CancellationToken::new();
        gate.pause();

        let waiter = {
            let gate = gate.clone();
            let stop = stop.clone();
            tokio::spawn(async move { gate.wait_if_paused(&stop).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        stop.cancel();

        let released = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stop should interrupt the wait")
            .unwrap();
        assert!(!released);
        assert!(gate.is_paused());
    }
}
