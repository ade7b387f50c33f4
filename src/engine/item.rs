// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{FailureKind, TaskError};

/// One unit of input paired with its stable key.
///
/// Keys are assigned at admission: the input index in bounded mode, a
/// monotonic counter in streaming mode. They are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem<T> {
    pub key: u64,
    pub payload: T,
}

/// The single recorded outcome of one key.
#[derive(Debug, Clone)]
pub enum TaskOutcome<R> {
    Success(R),
    Failure(TaskError),
}

impl<R> TaskOutcome<R> {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    pub fn value(&self) -> Option<&R> {
        match self {
            TaskOutcome::Success(value) => Some(value),
            TaskOutcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failure(error) => Some(error),
        }
    }

    /// Failure classification, `None` for successes.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error().map(TaskError::kind)
    }
}
