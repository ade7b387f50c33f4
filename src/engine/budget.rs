// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Result of recording one terminal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BudgetCheck {
    Within,
    /// This failure crossed the ceiling; the caller owns the abort.
    Exceeded {
        total_errors: usize,
        max_total_errors: usize,
    },
    /// The ceiling was crossed earlier by another worker.
    AlreadyExceeded,
}

/// Monotonic count of terminal failures with a one-shot trip wire.
///
/// `Stopped` outcomes are never recorded here; callers filter them out.
#[derive(Debug)]
pub(crate) struct ErrorBudget {
    limit: Option<usize>,
    total: AtomicUsize,
    tripped: AtomicBool,
}

impl ErrorBudget {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            total: AtomicUsize::new(0),
            tripped: AtomicBool::new(false),
        }
    }

    pub(crate) fn record_failure(&self) -> BudgetCheck {
        let total_errors = self.total.fetch_add(1, Ordering::AcqRel) + 1;
        let Some(max_total_errors) = self.limit else {
            return BudgetCheck::Within;
        };
        if total_errors < max_total_errors {
            return BudgetCheck::Within;
        }

        match self
            .tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => BudgetCheck::Exceeded {
                total_errors,
                max_total_errors,
            },
            Err(_) => BudgetCheck::AlreadyExceeded,
        }
    }

    pub(crate) fn total(&self) -> usize {
        self.total.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_unbounded_budget_never_trips() {
        let budget = ErrorBudget::new(None);
        for _ in 0..100 {
            assert_eq!(budget.record_failure(), BudgetCheck::Within);
        }
        assert_eq!(budget.total(), 100);
    }

    #[test]
    fn test_trips_exactly_once_at_ceiling() {
        let budget = ErrorBudget::new(Some(2));
        assert_eq!(budget.record_failure(), BudgetCheck::Within);
        assert_eq!(
            budget.record_failure(),
            BudgetCheck::Exceeded {
                total_errors: 2,
                max_total_errors: 2
            }
        );
        assert_eq!(budget.record_failure(), BudgetCheck::AlreadyExceeded);
        assert_eq!(budget.total(), 3);
    }

    #[test]
    fn test_concurrent_crossings_trip_once() {
        let budget = Arc::new(ErrorBudget::new(Some(3)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let budget = budget.clone();
                std::thread::spawn(move || budget.record_failure())
            })
            .collect();

        let exceeded = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|check| matches!(check, BudgetCheck::Exceeded { .. }))
            .count();
        assert_eq!(exceeded, 1);
    }
}
