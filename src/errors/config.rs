// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a processor or loading its configuration.
///
/// Every variant is returned synchronously, before any item is admitted.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Concurrency must allow at least one worker.
    #[error("concurrency must be at least 1 (got {value})")]
    InvalidConcurrency { value: usize },

    /// An error budget of zero would abort before anything could fail.
    #[error("max_total_errors must be at least 1 when set (got {value})")]
    InvalidErrorBudget { value: usize },

    /// The streaming poll interval must be positive.
    #[error("poll_interval_ms must be greater than zero")]
    InvalidPollInterval,

    /// The configuration file could not be read.
    #[error("failed to read configuration file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension is neither YAML nor TOML.
    #[error("unsupported configuration format for '{}' (expected .yaml, .yml or .toml)", path.display())]
    UnsupportedFormat { path: PathBuf },
}
