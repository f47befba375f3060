//! Recurring payment templates and due detection.

use std::collections::HashSet;

use budget_domain::{
    amount_out_of_range, Budget, RecurringTemplate, RecurringTemplatePatch, Transaction,
    YearMonth, MAX_AMOUNT,
};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{CoreError, CoreResult, SummaryService};

/// Templates the user postponed during the current session. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnoozeSet {
    ids: HashSet<Uuid>,
}

impl SnoozeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the id was not snoozed before.
    pub fn snooze(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// Manages recurring templates and turns due ones into transactions.
pub struct RecurringService;

impl RecurringService {
    pub fn add(budget: &mut Budget, template: RecurringTemplate) -> CoreResult<Uuid> {
        let mut template = template;
        template.name = template.name.trim().to_string();
        Self::validate(budget, &template, None)?;
        let id = template.id;
        debug!(%id, name = %template.name, day = template.day, "recurring template added");
        budget.recurring_templates.push(template);
        Ok(id)
    }

    pub fn update(budget: &mut Budget, id: Uuid, patch: &RecurringTemplatePatch) -> CoreResult<()> {
        let index = Self::position(budget, id)?;
        let current = &budget.recurring_templates[index];
        let mut next = patch.apply(current);
        next.name = next.name.trim().to_string();
        Self::validate(budget, &next, Some(current))?;
        debug!(%id, "recurring template updated");
        budget.recurring_templates[index] = next;
        Ok(())
    }

    /// Removes a template. Transactions it produced keep their reference.
    pub fn remove(budget: &mut Budget, id: Uuid) -> CoreResult<RecurringTemplate> {
        let index = Self::position(budget, id)?;
        debug!(%id, "recurring template removed");
        Ok(budget.recurring_templates.remove(index))
    }

    pub fn set_active(budget: &mut Budget, id: Uuid, active: bool) -> CoreResult<()> {
        let patch = RecurringTemplatePatch {
            active: Some(active),
            ..RecurringTemplatePatch::default()
        };
        Self::update(budget, id, &patch)
    }

    /// Whether `template` should be offered for confirmation while `period`
    /// is on screen.
    ///
    /// Only the current month is ever due, and only once its day has come.
    /// Any transaction in `period_transactions` that references the template
    /// counts as the occurrence having been recorded.
    pub fn is_due(
        template: &RecurringTemplate,
        period: YearMonth,
        today: NaiveDate,
        period_transactions: &[&Transaction],
        snoozed: &SnoozeSet,
    ) -> bool {
        template.active
            && period == YearMonth::from_date(today)
            && template.clamped_day(period) <= today.day()
            && !period_transactions
                .iter()
                .any(|txn| txn.recurring_ref == Some(template.id))
            && !snoozed.contains(template.id)
    }

    /// First due template in list order, if any.
    pub fn next_due<'a>(
        budget: &'a Budget,
        today: NaiveDate,
        snoozed: &SnoozeSet,
    ) -> Option<&'a RecurringTemplate> {
        let period_transactions = SummaryService::month_transactions(budget, budget.period);
        budget.recurring_templates.iter().find(|template| {
            Self::is_due(template, budget.period, today, &period_transactions, snoozed)
        })
    }

    /// Records the occurrence of a template as a transaction dated `today`.
    /// `amount` overrides the template amount when given.
    pub fn confirm(
        budget: &mut Budget,
        id: Uuid,
        today: NaiveDate,
        account: &str,
        amount: Option<u64>,
    ) -> CoreResult<Uuid> {
        let template = budget.template(id).ok_or(CoreError::TemplateNotFound(id))?;
        let amount = amount.unwrap_or(template.amount);
        if amount == 0 {
            return Err(CoreError::Validation("Amount must be greater than zero".into()));
        }
        if amount > MAX_AMOUNT {
            return Err(CoreError::Validation(amount_out_of_range(amount)));
        }
        if !budget.has_account(account) {
            return Err(CoreError::AccountNotFound(account.to_string()));
        }
        let transaction = Transaction::new(today, account, template.category.clone(), amount)
            .with_description(format!("{} (recurring)", template.name))
            .with_recurring_ref(template.id);
        let txn_id = transaction.id;
        info!(template = %id, transaction = %txn_id, amount, "recurring payment confirmed");
        budget.transactions.insert(0, transaction);
        Ok(txn_id)
    }

    /// Sum of the amounts of all active templates.
    pub fn monthly_total(budget: &Budget) -> u64 {
        budget
            .recurring_templates
            .iter()
            .filter(|template| template.active)
            .fold(0u64, |total, template| total.saturating_add(template.amount))
    }

    fn position(budget: &Budget, id: Uuid) -> CoreResult<usize> {
        budget
            .recurring_templates
            .iter()
            .position(|template| template.id == id)
            .ok_or(CoreError::TemplateNotFound(id))
    }

    fn validate(
        budget: &Budget,
        candidate: &RecurringTemplate,
        previous: Option<&RecurringTemplate>,
    ) -> CoreResult<()> {
        if candidate.name.is_empty() {
            return Err(CoreError::Validation("Template name cannot be empty".into()));
        }
        if candidate.amount == 0 {
            return Err(CoreError::Validation("Amount must be greater than zero".into()));
        }
        if candidate.amount > MAX_AMOUNT {
            return Err(CoreError::Validation(amount_out_of_range(candidate.amount)));
        }
        if !(1..=31).contains(&candidate.day) {
            return Err(CoreError::Validation(format!(
                "Day {} must be between 1 and 31",
                candidate.day
            )));
        }
        let category_changed = previous.map_or(true, |prev| prev.category != candidate.category);
        if category_changed && budget.category(&candidate.category).is_none() {
            return Err(CoreError::CategoryNotFound(candidate.category.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use budget_domain::{Category, CategoryGroup};

    use super::*;

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn budget_with_rent() -> (Budget, Uuid) {
        let mut budget = Budget::new("2025-10".parse().unwrap());
        budget.accounts.push("Checking".into());
        budget
            .categories
            .push(Category::new("Rent", CategoryGroup::Needs));
        let id = RecurringService::add(
            &mut budget,
            RecurringTemplate::new("Rent", "Rent", 11500, 15),
        )
        .unwrap();
        (budget, id)
    }

    #[test]
    fn due_only_on_or_after_day_in_current_month() {
        let (budget, _) = budget_with_rent();
        let template = &budget.recurring_templates[0];
        let snoozed = SnoozeSet::new();
        let october = budget.period;
        assert!(!RecurringService::is_due(template, october, day(10, 14), &[], &snoozed));
        assert!(RecurringService::is_due(template, october, day(10, 15), &[], &snoozed));
        assert!(!RecurringService::is_due(template, october, day(11, 20), &[], &snoozed));
    }

    #[test]
    fn recorded_snoozed_or_inactive_templates_are_not_due() {
        let (mut budget, id) = budget_with_rent();
        let today = day(10, 16);
        let mut snoozed = SnoozeSet::new();
        assert_eq!(
            RecurringService::next_due(&budget, today, &snoozed).map(|t| t.id),
            Some(id)
        );

        snoozed.snooze(id);
        assert!(RecurringService::next_due(&budget, today, &snoozed).is_none());
        snoozed.clear();

        RecurringService::set_active(&mut budget, id, false).unwrap();
        assert!(RecurringService::next_due(&budget, today, &snoozed).is_none());
        RecurringService::set_active(&mut budget, id, true).unwrap();

        RecurringService::confirm(&mut budget, id, today, "Checking", None).unwrap();
        assert!(RecurringService::next_due(&budget, today, &snoozed).is_none());
    }

    #[test]
    fn day_is_clamped_for_short_months() {
        let template = RecurringTemplate::new("Rent", "Rent", 100, 31);
        let february: YearMonth = "2025-02".parse().unwrap();
        let snoozed = SnoozeSet::new();
        assert!(RecurringService::is_due(&template, february, day(2, 28), &[], &snoozed));
    }

    #[test]
    fn confirm_records_tagged_transaction() {
        let (mut budget, id) = budget_with_rent();
        let txn_id =
            RecurringService::confirm(&mut budget, id, day(10, 16), "Checking", Some(12000))
                .unwrap();
        let txn = budget.transaction(txn_id).unwrap();
        assert_eq!(txn.description, "Rent (recurring)");
        assert_eq!(txn.amount, 12000);
        assert_eq!(txn.recurring_ref, Some(id));
        assert_eq!(txn.date, day(10, 16));

        let err = RecurringService::confirm(&mut budget, id, day(10, 16), "Wallet", None)
            .expect_err("unknown account");
        assert!(matches!(err, CoreError::AccountNotFound(_)), "unexpected error: {err:?}");
    }

    #[test]
    fn add_validates_fields() {
        let (mut budget, _) = budget_with_rent();
        assert!(RecurringService::add(&mut budget, RecurringTemplate::new(" ", "Rent", 1, 1)).is_err());
        assert!(RecurringService::add(&mut budget, RecurringTemplate::new("X", "Rent", 0, 1)).is_err());
        assert!(RecurringService::add(&mut budget, RecurringTemplate::new("X", "Rent", 1, 32)).is_err());
        assert!(RecurringService::add(&mut budget, RecurringTemplate::new("X", "Nope", 1, 1)).is_err());
        assert_eq!(budget.recurring_templates.len(), 1);
    }

    #[test]
    fn monthly_total_counts_active_templates() {
        let (mut budget, id) = budget_with_rent();
        RecurringService::add(&mut budget, RecurringTemplate::new("Gym", "Rent", 790, 5)).unwrap();
        assert_eq!(RecurringService::monthly_total(&budget), 12290);
        RecurringService::set_active(&mut budget, id, false).unwrap();
        assert_eq!(RecurringService::monthly_total(&budget), 790);
    }

    #[test]
    fn oversized_template_amounts_are_rejected() {
        let (mut budget, id) = budget_with_rent();
        let patch = RecurringTemplatePatch {
            amount: Some(u64::MAX),
            ..RecurringTemplatePatch::default()
        };
        assert!(RecurringService::update(&mut budget, id, &patch).is_err());

        let err = RecurringService::confirm(&mut budget, id, day(10, 16), "Checking", Some(u64::MAX))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(budget.transactions.is_empty());
    }

    #[test]
    fn monthly_total_saturates() {
        let (mut budget, _) = budget_with_rent();
        budget.recurring_templates.push(RecurringTemplate::new("Big", "Rent", u64::MAX, 1));
        assert_eq!(RecurringService::monthly_total(&budget), u64::MAX);
    }
}
