use async_trait::async_trait;

use crate::errors::SourceError;

/// Result of a single pull from an [`ItemSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pull<T> {
    /// The next payload.
    Item(T),
    /// Nothing available right now; ask again after the poll interval.
    Empty,
    /// The source will never produce another item.
    Exhausted,
}

/// Where work items come from.
///
/// Pulls are serialized by the engine, so implementations never see two
/// concurrent `pull_next` calls. Keys are assigned by the engine, not the source.
#[async_trait]
pub trait ItemSource<T>: Send {
    async fn pull_next(&mut self) -> Result<Pull<T>, SourceError>;

    fn is_exhausted(&self) -> bool;

    /// Number of items still to come, when known up front. Reported in the
    /// batch start event.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}
