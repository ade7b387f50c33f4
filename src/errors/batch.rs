// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use thiserror::Error;

/// A pull from a streaming item source failed. Fatal for the batch.
#[derive(Debug, Clone, Error)]
#[error("item source failed: {0}")]
pub struct SourceError(Arc<anyhow::Error>);

impl SourceError {
    pub fn new(error: anyhow::Error) -> Self {
        Self(Arc::new(error))
    }
}

impl From<anyhow::Error> for SourceError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(error)
    }
}

/// Why a batch settled early with partial results.
#[derive(Debug, Clone, Error)]
pub enum AbortReason {
    /// `stop(true)` was called.
    #[error("batch stopped by caller")]
    StoppedByCaller,

    /// Terminal failures reached the configured ceiling.
    #[error("error budget exceeded: {total_errors} failures reached the limit of {max_total_errors}")]
    ErrorBudgetExceeded {
        total_errors: usize,
        max_total_errors: usize,
    },

    /// The streaming source could not produce its next item.
    #[error("streaming source failed")]
    SourceFailed(#[source] SourceError),
}
