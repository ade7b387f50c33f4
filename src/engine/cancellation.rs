// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-attempt cancellation contexts and the registry of in-flight attempts.
//!
//! Each attempt owns exactly one [`CancellationContext`]. The immediate-stop
//! path reaches contexts only through [`InFlightRegistry::cancel_all`], and it
//! never touches anything else about the attempt.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

const CAUSE_NONE: u8 = 0;
const CAUSE_TIMEOUT: u8 = 1;
const CAUSE_STOPPED: u8 = 2;

/// Why a context was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    Timeout,
    Stopped,
}

/// Cooperative cancellation signal handed to a handler.
///
/// Cloning is cheap and every clone observes the same flag. The first
/// `cancel` wins: its cause is the one reported by [`cause`](Self::cause).
#[derive(Debug, Clone)]
pub struct CancellationContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug)]
struct ContextInner {
    token: CancellationToken,
    cause: AtomicU8,
}

impl Default for CancellationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationContext {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContextInner {
                token: CancellationToken::new(),
                cause: AtomicU8::new(CAUSE_NONE),
            }),
        }
    }

    pub fn cancel(&self, cause: CancelCause) {
        let code = match cause {
            CancelCause::Timeout => CAUSE_TIMEOUT,
            CancelCause::Stopped => CAUSE_STOPPED,
        };
        let _ = self.inner.cause.compare_exchange(
            CAUSE_NONE,
            code,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.inner.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    pub fn cause(&self) -> Option<CancelCause> {
        match self.inner.cause.load(Ordering::Acquire) {
            CAUSE_TIMEOUT => Some(CancelCause::Timeout),
            CAUSE_STOPPED => Some(CancelCause::Stopped),
            _ => None,
        }
    }

    /// The underlying token, for handlers that want to hand it to other
    /// tokio-aware code.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }
}

/// Contexts of the attempts currently running, keyed by item key.
///
/// Once closed by `cancel_all`, any context registered afterwards is
/// cancelled on the spot, so an attempt racing the stop cannot slip through.
#[derive(Debug, Default)]
pub(crate) struct InFlightRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    contexts: HashMap<u64, CancellationContext>,
    closed: bool,
}

impl InFlightRegistry {
    pub(crate) fn register(&self, key: u64, context: CancellationContext) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.closed {
            context.cancel(CancelCause::Stopped);
        }
        inner.contexts.insert(key, context);
    }

    pub(crate) fn release(&self, key: u64) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.contexts.remove(&key);
    }

    /// Cancel every tracked context and refuse new ones. Returns how many
    /// contexts were cancelled.
    pub(crate) fn cancel_all(&self, cause: CancelCause) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.closed = true;
        for context in inner.contexts.values() {
            context.cancel(cause);
        }
        inner.contexts.len()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contexts
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_cause_wins() {
        let context = CancellationContext::new();
        assert!(!context.is_cancelled());
        assert_eq!(context.cause(), None);

        context.cancel(CancelCause::Timeout);
        context.cancel(CancelCause::Stopped);

        assert!(context.is_cancelled());
        assert_eq!(context.cause(), Some(CancelCause::Timeout));
    }

    #[test]
    fn test_clones_share_state() {
        let context = CancellationContext::new();
        let clone = context.clone();
        clone.cancel(CancelCause::Stopped);
        assert!(context.is_cancelled());
        assert!(context.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let context = CancellationContext::new();
        let waiter = context.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        context.cancel(CancelCause::Stopped);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[test]
    fn test_cancel_all_reaches_tracked_contexts_only() {
        let registry = InFlightRegistry::default();
        let running = CancellationContext::new();
        let finished = CancellationContext::new();
        registry.register(0, running.clone());
        registry.register(1, finished.clone());
        registry.release(1);

        assert_eq!(registry.cancel_all(CancelCause::Stopped), 1);
        assert_eq!(running.cause(), Some(CancelCause::Stopped));
        assert!(!finished.is_cancelled());
    }

    #[test]
    fn test_register_after_close_cancels_immediately() {
        let registry = InFlightRegistry::default();
        registry.cancel_all(CancelCause::Stopped);

        let late = CancellationContext::new();
        registry.register(9, late.clone());
        assert!(late.is_cancelled());
        assert_eq!(registry.len(), 1);
    }
}
