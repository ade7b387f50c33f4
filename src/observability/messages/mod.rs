// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `engine` - batch and worker lifecycle: start, settlement, pause/resume, aborts
//! * `task` - per-item events: start, retry, timeout, failure, progress
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_conveyor::observability::messages::engine::BatchStarted;
//! use the_conveyor::observability::messages::StructuredLog;
//!
//! let msg = BatchStarted {
//!     mode: "bounded",
//!     concurrency: 4,
//!     item_count: Some(100),
//! };
//!
//! tracing::info!("{}", msg);
//! let _span = msg.span("batch");
//! ```

use tracing::Span;

pub mod engine;
pub mod task;

/// A message that knows how to emit itself as a structured `tracing` event.
pub trait StructuredLog {
    /// Emit the event at the message's documented level.
    fn log(&self);

    /// A span carrying the same fields. Messages that never open a span keep
    /// the disabled default.
    fn span(&self, _name: &str) -> Span {
        Span::none()
    }
}
