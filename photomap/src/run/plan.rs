//! Deciding what a run has to do.

use std::fmt;

/// Default cap on photos fetched in one run.
pub const DEFAULT_MAX_PHOTOS: usize = 100_000;

/// The three ways a run can go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The upstream total is unchanged; nothing is fetched or written.
    NoOp,
    /// Photos were added upstream; only the newest ones are fetched.
    Incremental,
    /// The upstream total shrank. Photos were deleted, and since the store
    /// cannot tell which, the whole map is rebuilt.
    FullReset,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => write!(f, "no-op"),
            Self::Incremental => write!(f, "incremental"),
            Self::FullReset => write!(f, "full reset"),
        }
    }
}

/// A run's outcome and fetch window.
///
/// Only totals are compared. Ten photos deleted and ten added between runs
/// looks like no change at all; such a run is a no-op and the deletions are
/// only picked up by a later reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPlan {
    pub outcome: RunOutcome,
    /// Total recorded by the last successful run (0 if none).
    pub previous_total: u64,
    pub current_total: u64,
    /// Newest records to request from the source.
    pub fetch_limit: usize,
}

impl RunPlan {
    /// Compare totals and size the fetch window.
    pub fn decide(previous_total: Option<u64>, current_total: u64, max_photos: usize) -> Self {
        let previous_total = previous_total.unwrap_or(0);
        let (outcome, window) = if current_total == previous_total {
            (RunOutcome::NoOp, 0)
        } else if current_total < previous_total {
            (RunOutcome::FullReset, current_total)
        } else {
            (RunOutcome::Incremental, current_total - previous_total)
        };

        Self {
            outcome,
            previous_total,
            current_total,
            fetch_limit: usize::try_from(window).unwrap_or(usize::MAX).min(max_photos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_total_is_noop() {
        let plan = RunPlan::decide(Some(120), 120, DEFAULT_MAX_PHOTOS);
        assert_eq!(plan.outcome, RunOutcome::NoOp);
        assert_eq!(plan.fetch_limit, 0);
    }

    #[test]
    fn test_growth_fetches_only_the_delta() {
        let plan = RunPlan::decide(Some(120), 125, DEFAULT_MAX_PHOTOS);
        assert_eq!(plan.outcome, RunOutcome::Incremental);
        assert_eq!(plan.fetch_limit, 5);
    }

    #[test]
    fn test_first_run_fetches_everything() {
        let plan = RunPlan::decide(None, 300, DEFAULT_MAX_PHOTOS);
        assert_eq!(plan.outcome, RunOutcome::Incremental);
        assert_eq!(plan.previous_total, 0);
        assert_eq!(plan.fetch_limit, 300);
    }

    #[test]
    fn test_first_run_on_empty_source_is_noop() {
        assert_eq!(RunPlan::decide(None, 0, 10).outcome, RunOutcome::NoOp);
    }

    #[test]
    fn test_shrink_triggers_full_reset() {
        let plan = RunPlan::decide(Some(120), 118, DEFAULT_MAX_PHOTOS);
        assert_eq!(plan.outcome, RunOutcome::FullReset);
        assert_eq!(plan.fetch_limit, 118);
    }

    #[test]
    fn test_window_is_capped() {
        assert_eq!(RunPlan::decide(None, 250_000, DEFAULT_MAX_PHOTOS).fetch_limit, 100_000);
        assert_eq!(RunPlan::decide(Some(10), 5, 3).fetch_limit, 3);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(RunOutcome::FullReset.to_string(), "full reset");
    }
}
