//! Selected-period navigation.

use budget_domain::{Budget, YearMonth};
use tracing::debug;

pub struct PeriodService;

impl PeriodService {
    pub fn current(budget: &Budget) -> YearMonth {
        budget.period
    }

    pub fn set(budget: &mut Budget, period: YearMonth) {
        debug!(%period, "period selected");
        budget.period = period;
    }

    /// Moves the selected period by `delta` whole months and returns the new period.
    pub fn shift(budget: &mut Budget, delta: i32) -> YearMonth {
        let next = budget.period.shift(delta);
        Self::set(budget, next);
        next
    }
}
