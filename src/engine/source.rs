// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The two stock [`ItemSource`] implementations.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;

use crate::errors::SourceError;
use crate::traits::{ItemSource, Pull};

/// A fixed, ordered list of items. Drives bounded mode.
#[derive(Debug)]
pub struct FixedSource<T> {
    items: VecDeque<T>,
}

impl<T> FixedSource<T> {
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }
}

#[async_trait]
impl<T: Send> ItemSource<T> for FixedSource<T> {
    async fn pull_next(&mut self) -> Result<Pull<T>, SourceError> {
        Ok(match self.items.pop_front() {
            Some(item) => Pull::Item(item),
            None => Pull::Exhausted,
        })
    }

    fn is_exhausted(&self) -> bool {
        self.items.is_empty()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// A pull callback. Drives streaming mode.
///
/// The callback returns `Pull::Item`, `Pull::Empty` (try again later) or
/// `Pull::Exhausted`. Once it reports exhaustion it is never called again.
/// An `Err` is a fatal pull failure for the batch.
///
/// ```rust
/// use the_conveyor::engine::CallbackSource;
/// use the_conveyor::traits::Pull;
///
/// let mut remaining = vec![3, 2, 1];
/// let source = CallbackSource::new(move || {
///     let next = remaining.pop();
///     async move {
///         Ok::<_, anyhow::Error>(match next {
///             Some(n) => Pull::Item(n),
///             None => Pull::Exhausted,
///         })
///     }
/// });
/// # let _ = source;
/// ```
pub struct CallbackSource<F> {
    pull: F,
    exhausted: bool,
}

impl<F> CallbackSource<F> {
    pub fn new(pull: F) -> Self {
        Self {
            pull,
            exhausted: false,
        }
    }
}

#[async_trait]
impl<T, F, Fut> ItemSource<T> for CallbackSource<F>
where
    T: Send,
    F: FnMut() -> Fut + Send,
    Fut: Future<Output = anyhow::Result<Pull<T>>> + Send,
{
    async fn pull_next(&mut self) -> Result<Pull<T>, SourceError> {
        if self.exhausted {
            return Ok(Pull::Exhausted);
        }

        let pulled = (self.pull)().await?;
        if matches!(pulled, Pull::Exhausted) {
            self.exhausted = true;
        }
        Ok(pulled)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fixed_source_yields_in_order_then_exhausts() {
        let mut source = FixedSource::new(vec!["a", "b"]);
        assert_eq!(source.size_hint(), Some(2));

        assert_eq!(source.pull_next().await.unwrap(), Pull::Item("a"));
        assert_eq!(source.pull_next().await.unwrap(), Pull::Item("b"));
        assert!(source.is_exhausted());
        assert_eq!(source.pull_next().await.unwrap(), Pull::Exhausted);
    }

    #[tokio::test]
    async fn test_callback_source_stops_calling_after_exhaustion() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let mut source = CallbackSource::new(move || {
            let call = calls_clone.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, anyhow::Error>(match call {
                    0 => Pull::Item(10),
                    1 => Pull::Empty,
                    _ => Pull::Exhausted,
                })
            }
        });

        assert_eq!(source.pull_next().await.unwrap(), Pull::Item(10));
        assert_eq!(source.pull_next().await.unwrap(), Pull::Empty);
        assert!(!source.is_exhausted());
        assert_eq!(source.pull_next().await.unwrap(), Pull::Exhausted);
        assert_eq!(source.pull_next().await.unwrap(), Pull::Exhausted);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_callback_source_surfaces_errors() {
        let mut source =
            CallbackSource::new(|| async { Err::<Pull<u8>, _>(anyhow::anyhow!("queue offline")) });

        let error = source.pull_next().await.unwrap_err();
        assert!(error.to_string().contains("queue offline"));
        assert!(!source.is_exhausted());
    }
}
