//! Validated transaction mutations and input helpers.

use std::collections::HashMap;

use budget_domain::{
    amount_out_of_range, Budget, Transaction, TransactionPatch, YearMonth, MAX_AMOUNT,
    UNCATEGORIZED,
};
use chrono::{Datelike, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::{sorting::locale_compare, CoreError, CoreResult};

/// Minimum query length before description suggestions are produced.
pub const SUGGESTION_MIN_QUERY: usize = 2;
/// Upper bound on returned description suggestions.
pub const SUGGESTION_LIMIT: usize = 8;

/// Provides validated CRUD operations for [`Transaction`] records.
pub struct TransactionService;

impl TransactionService {
    /// Validates and records a transaction. New entries are prepended so the
    /// stored list reads newest first.
    pub fn add(budget: &mut Budget, transaction: Transaction) -> CoreResult<Uuid> {
        let mut transaction = transaction;
        transaction.description = transaction.description.trim().to_string();
        Self::validate(budget, &transaction, None)?;
        let id = transaction.id;
        debug!(%id, date = %transaction.date, amount = transaction.amount, "transaction added");
        budget.transactions.insert(0, transaction);
        Ok(id)
    }

    /// Applies `patch` to the transaction identified by `id`. The patched
    /// record is validated as a whole before it replaces the stored one.
    pub fn update(budget: &mut Budget, id: Uuid, patch: &TransactionPatch) -> CoreResult<()> {
        let index = Self::position(budget, id)?;
        let current = &budget.transactions[index];
        let mut next = patch.apply(current);
        next.description = next.description.trim().to_string();
        Self::validate(budget, &next, Some(current))?;
        debug!(%id, "transaction updated");
        budget.transactions[index] = next;
        Ok(())
    }

    /// Removes the transaction identified by `id` and returns it.
    pub fn remove(budget: &mut Budget, id: Uuid) -> CoreResult<Transaction> {
        let index = Self::position(budget, id)?;
        debug!(%id, "transaction removed");
        Ok(budget.transactions.remove(index))
    }

    /// Descriptions previously used that contain `query`, most frequent first.
    pub fn suggest_descriptions(budget: &Budget, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.chars().count() < SUGGESTION_MIN_QUERY {
            return Vec::new();
        }
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for description in budget
            .transactions
            .iter()
            .map(|txn| txn.description.trim())
            .filter(|description| !description.is_empty())
            .filter(|description| description.to_lowercase().contains(&needle))
        {
            *counts.entry(description).or_default() += 1;
        }
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|(a_text, a_count), (b_text, b_count)| {
            b_count.cmp(a_count).then_with(|| locale_compare(a_text, b_text))
        });
        ranked
            .into_iter()
            .take(SUGGESTION_LIMIT)
            .map(|(text, _)| text.to_string())
            .collect()
    }

    /// Pre-filled date for a new transaction: the selected period with
    /// today's day-of-month, clamped to the period length.
    pub fn default_date(period: YearMonth, today: NaiveDate) -> NaiveDate {
        period.date(today.day())
    }

    fn position(budget: &Budget, id: Uuid) -> CoreResult<usize> {
        budget
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(CoreError::TransactionNotFound(id))
    }

    /// Checks a candidate record. When `previous` is given only the fields
    /// that changed are re-validated against the store.
    pub(crate) fn validate(
        budget: &Budget,
        candidate: &Transaction,
        previous: Option<&Transaction>,
    ) -> CoreResult<()> {
        let account_changed = previous.map_or(true, |prev| prev.account != candidate.account);
        let category_changed = previous.map_or(true, |prev| prev.category != candidate.category);
        let date_changed = previous.map_or(true, |prev| prev.date != candidate.date);

        if candidate.amount == 0 {
            return Err(CoreError::Validation("Amount must be greater than zero".into()));
        }
        if candidate.amount > MAX_AMOUNT {
            return Err(CoreError::Validation(amount_out_of_range(candidate.amount)));
        }
        if account_changed {
            if candidate.account.trim().is_empty() {
                return Err(CoreError::Validation("Account is required".into()));
            }
            if !budget.has_account(&candidate.account) {
                return Err(CoreError::AccountNotFound(candidate.account.clone()));
            }
        }
        if category_changed {
            if candidate.category == UNCATEGORIZED {
                return Err(CoreError::Validation("Choose a category".into()));
            }
            if budget.category(&candidate.category).is_none() {
                return Err(CoreError::CategoryNotFound(candidate.category.clone()));
            }
        }
        if date_changed && !budget.period.contains(candidate.date) {
            return Err(CoreError::Validation(format!(
                "Date {} is outside the selected period {}",
                candidate.date, budget.period
            )));
        }
        Ok(())
    }
}
