// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod batch;
mod config;
mod task;

pub use batch::{AbortReason, SourceError};
pub use config::ConfigurationError;
pub use task::{FailureKind, TaskError};
