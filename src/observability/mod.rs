// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every log line the engine emits goes through a message struct in
//! [`messages`]. Message types implement `Display` for the human-readable text
//! and [`StructuredLog`](messages::StructuredLog) for the structured `tracing`
//! event, which:
//!
//! * Keeps log wording out of the scheduling code
//! * Gives every event the same field names wherever it is emitted
//! * Lets spans and events for one task share their fields
//!
//! [`TracingHooks`] wires the processor's notification points to these
//! messages and is the default hook set.
//!
//! # Usage
//!
//! ```rust
//! use the_conveyor::observability::messages::task::TaskTimedOut;
//! use the_conveyor::observability::messages::StructuredLog;
//! use std::time::Duration;
//!
//! let msg = TaskTimedOut {
//!     key: 3,
//!     timeout: Duration::from_millis(250),
//! };
//!
//! msg.log();
//! ```

mod hooks;
pub mod messages;

pub use hooks::TracingHooks;
