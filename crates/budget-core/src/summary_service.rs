//! Derived views over a single period: totals, comparison and breakdowns.

use std::collections::HashMap;

use budget_domain::{Budget, CategoryGroup, Transaction, YearMonth};
use serde::Serialize;

use crate::sorting::locale_compare;

/// Number of categories charted individually before the rest is merged.
pub const CHART_TOP_N: usize = 8;
/// Label of the merged overflow slice.
pub const OTHER_LABEL: &str = "Other";
/// Colours assigned to chart slices by position, cycled when exhausted.
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Amount sums per category group for one period, in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupTotals {
    pub income: u64,
    pub needs: u64,
    pub wants: u64,
    pub savings: u64,
}

impl GroupTotals {
    pub fn expenses(&self) -> u64 {
        self.needs.saturating_add(self.wants).saturating_add(self.savings)
    }

    /// Income minus expenses.
    pub fn balance(&self) -> i64 {
        to_signed(self.income).saturating_sub(to_signed(self.expenses()))
    }

    pub fn by_group(&self, group: CategoryGroup) -> u64 {
        match group {
            CategoryGroup::Income => self.income,
            CategoryGroup::Needs => self.needs,
            CategoryGroup::Wants => self.wants,
            CategoryGroup::Savings => self.savings,
        }
    }

    fn add(&mut self, group: CategoryGroup, amount: u64) {
        let slot = match group {
            CategoryGroup::Income => &mut self.income,
            CategoryGroup::Needs => &mut self.needs,
            CategoryGroup::Wants => &mut self.wants,
            CategoryGroup::Savings => &mut self.savings,
        };
        *slot = slot.saturating_add(amount);
    }
}

/// Current period against the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodComparison {
    pub current: GroupTotals,
    pub previous: GroupTotals,
    /// `false` when the previous period has no transactions at all; the
    /// comparison is then not worth showing.
    pub previous_has_data: bool,
}

impl PeriodComparison {
    pub fn income_delta(&self) -> i64 {
        to_signed(self.current.income).saturating_sub(to_signed(self.previous.income))
    }

    pub fn expense_delta(&self) -> i64 {
        to_signed(self.current.expenses()).saturating_sub(to_signed(self.previous.expenses()))
    }

    pub fn balance_delta(&self) -> i64 {
        self.current.balance().saturating_sub(self.previous.balance())
    }
}

/// One expense category's share of the period's expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub group: CategoryGroup,
    pub value: u64,
    /// Whole percent of total expenses.
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSlice {
    pub label: String,
    pub value: u64,
    pub color: &'static str,
}

/// Chart and legend input. An empty slice list means nothing to draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub slices: Vec<ChartSlice>,
    pub total: u64,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Pure derivations scoped to a period.
pub struct SummaryService;

impl SummaryService {
    /// Transactions dated within `period`, in store order.
    pub fn month_transactions(budget: &Budget, period: YearMonth) -> Vec<&Transaction> {
        budget
            .transactions
            .iter()
            .filter(|txn| period.contains(txn.date))
            .collect()
    }

    /// Group totals for `period`. Uncategorized entries are not counted.
    pub fn totals(budget: &Budget, period: YearMonth) -> GroupTotals {
        let mut totals = GroupTotals::default();
        for txn in Self::month_transactions(budget, period) {
            if let Some(group) = budget.group_of(&txn.category) {
                totals.add(group, txn.amount);
            }
        }
        totals
    }

    pub fn compare_with_previous(budget: &Budget, period: YearMonth) -> PeriodComparison {
        let previous = period.previous();
        PeriodComparison {
            current: Self::totals(budget, period),
            previous: Self::totals(budget, previous),
            previous_has_data: !Self::month_transactions(budget, previous).is_empty(),
        }
    }

    /// Expense categories of `period` ordered by value, largest first.
    ///
    /// Income and uncategorized entries are skipped. The values always add up
    /// to [`GroupTotals::expenses`] for the same period; an empty result means
    /// there were no expenses.
    pub fn category_breakdown(budget: &Budget, period: YearMonth) -> Vec<CategoryShare> {
        let mut sums: HashMap<&str, (CategoryGroup, u64)> = HashMap::new();
        for txn in Self::month_transactions(budget, period) {
            let Some(group) = budget.group_of(&txn.category) else {
                continue;
            };
            if !group.is_expense() || txn.amount == 0 {
                continue;
            }
            let entry = sums.entry(txn.category.as_str()).or_insert((group, 0));
            entry.1 = entry.1.saturating_add(txn.amount);
        }
        let total = saturating_sum(sums.values().map(|(_, value)| *value));
        let mut shares: Vec<CategoryShare> = sums
            .into_iter()
            .map(|(category, (group, value))| CategoryShare {
                category: category.to_string(),
                group,
                value,
                percent: percent_of(value, total),
            })
            .collect();
        shares.sort_by(|a, b| {
            b.value
                .cmp(&a.value)
                .then_with(|| locale_compare(&a.category, &b.category))
        });
        shares
    }

    /// Breakdown reduced to the top categories plus an overflow slice.
    pub fn chart_data(budget: &Budget, period: YearMonth) -> ChartData {
        chart_slices(&Self::category_breakdown(budget, period))
    }
}

/// Keeps the first [`CHART_TOP_N`] shares and merges the remainder into an
/// [`OTHER_LABEL`] slice when it is non-zero.
pub fn chart_slices(shares: &[CategoryShare]) -> ChartData {
    let mut slices: Vec<ChartSlice> = shares
        .iter()
        .take(CHART_TOP_N)
        .enumerate()
        .map(|(idx, share)| ChartSlice {
            label: share.category.clone(),
            value: share.value,
            color: PALETTE[idx % PALETTE.len()],
        })
        .collect();
    let rest = saturating_sum(shares.iter().skip(CHART_TOP_N).map(|share| share.value));
    if rest > 0 {
        slices.push(ChartSlice {
            label: OTHER_LABEL.to_string(),
            value: rest,
            color: PALETTE[slices.len() % PALETTE.len()],
        });
    }
    let total = saturating_sum(slices.iter().map(|slice| slice.value));
    ChartData { slices, total }
}

/// `value` as a whole percent of `total`, rounded half up.
pub fn percent_of(value: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (u128::from(value) * 200 + u128::from(total)) / (u128::from(total) * 2);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

fn saturating_sum(values: impl Iterator<Item = u64>) -> u64 {
    values.fold(0, u64::saturating_add)
}

fn to_signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
