// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Up-front validation of processor options.
//!
//! Runs when a processor is built and when a configuration file is loaded, so a
//! bad value is reported before any item is admitted.

use crate::config::ProcessorOptions;
use crate::errors::ConfigurationError;

/// Check that the options describe a runnable pool.
///
/// Returns the first problem found:
/// 1. `concurrency` must be at least 1
/// 2. `max_total_errors`, when set, must be at least 1
/// 3. `poll_interval` must be non-zero
pub fn validate_options(options: &ProcessorOptions) -> Result<(), ConfigurationError> {
    if options.concurrency == 0 {
        return Err(ConfigurationError::InvalidConcurrency {
            value: options.concurrency,
        });
    }

    if let Some(value) = options.max_total_errors {
        if value == 0 {
            return Err(ConfigurationError::InvalidErrorBudget { value });
        }
    }

    if options.poll_interval.is_zero() {
        return Err(ConfigurationError::InvalidPollInterval);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_options_are_valid() {
        assert!(validate_options(&ProcessorOptions::default()).is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let options = ProcessorOptions::default().with_concurrency(0);
        let error = validate_options(&options).unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidConcurrency { value: 0 }));
    }

    #[test]
    fn test_zero_error_budget_rejected() {
        let options = ProcessorOptions::default().with_max_total_errors(0);
        let error = validate_options(&options).unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidErrorBudget { value: 0 }));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let options = ProcessorOptions::default().with_poll_interval(Duration::ZERO);
        assert!(matches!(
            validate_options(&options),
            Err(ConfigurationError::InvalidPollInterval)
        ));
    }
}
