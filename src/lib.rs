// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // options + file loading
pub mod engine;     // worker pool, streaming driver, settlement
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // handler, source and hook abstractions

pub use config::ProcessorOptions;
pub use engine::{BatchOutcome, BatchProcessor, CompletionSignal, TaskOutcome, WorkItem};
pub use errors::{AbortReason, FailureKind, TaskError};
