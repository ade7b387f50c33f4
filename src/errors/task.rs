// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-task failure types.
//!
//! A task failure never escalates the batch on its own. It is recorded as the
//! item's outcome and, unless it is a [`FailureKind::Stopped`], counted against
//! the error budget.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Classification of a terminal task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The handler returned an error.
    ApplicationError,
    /// The last attempt lost the race against the per-task timeout.
    Timeout,
    /// Immediate stop or cancellation intervened, or the item was never started.
    Stopped,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::ApplicationError => "application_error",
            FailureKind::Timeout => "timeout",
            FailureKind::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The error carried by a failed [`TaskOutcome`](crate::engine::TaskOutcome).
#[derive(Debug, Clone, Error)]
pub enum TaskError {
    /// Handler failure. Shared so hooks and the result set can both hold it.
    #[error("handler failed: {0}")]
    Application(Arc<anyhow::Error>),

    #[error("attempt timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("task stopped before completion")]
    Stopped,
}

impl TaskError {
    pub fn application(error: anyhow::Error) -> Self {
        TaskError::Application(Arc::new(error))
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            TaskError::Application(_) => FailureKind::ApplicationError,
            TaskError::Timeout { .. } => FailureKind::Timeout,
            TaskError::Stopped => FailureKind::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            TaskError::application(anyhow::anyhow!("boom")).kind(),
            FailureKind::ApplicationError
        );
        assert_eq!(
            TaskError::Timeout {
                after: Duration::from_millis(5)
            }
            .kind(),
            FailureKind::Timeout
        );
        assert_eq!(TaskError::Stopped.kind(), FailureKind::Stopped);
    }

    #[test]
    fn test_application_error_keeps_handler_message() {
        let error = TaskError::application(anyhow::anyhow!("disk full"));
        assert_eq!(error.to_string(), "handler failed: disk full");
        assert_eq!(FailureKind::Timeout.to_string(), "timeout");
    }
}
