mod admission;
mod budget;
pub mod cancellation;
mod completion;
mod gate;
mod item;
mod pool;
pub mod processor;
mod retry;
mod shared;
pub mod source;
mod state;
mod streaming;

pub use cancellation::{CancelCause, CancellationContext};
pub use completion::{BatchOutcome, CompletionSignal};
pub use item::{TaskOutcome, WorkItem};
pub use processor::BatchProcessor;
pub use retry::RetryLimit;
pub use source::{CallbackSource, FixedSource};
pub use state::ProcessorSnapshot;
