//! Business logic helpers for validated account mutations.

use budget_domain::Budget;
use tracing::debug;

use crate::{CoreError, CoreResult};

/// Provides validated mutations for account labels.
///
/// See also: [`crate::CategoryService`], which follows the same rename cascade.
pub struct AccountService;

impl AccountService {
    /// Adds a new account after validating the name.
    pub fn add(budget: &mut Budget, name: &str) -> CoreResult<()> {
        let name = Self::validate_name(budget, None, name)?;
        debug!(account = %name, "account added");
        budget.accounts.push(name);
        Ok(())
    }

    /// Renames an account and rewrites every transaction that references it.
    /// Returns the number of transactions touched.
    pub fn rename(budget: &mut Budget, current: &str, new_name: &str) -> CoreResult<usize> {
        let index = Self::position(budget, current)?;
        let new_name = Self::validate_name(budget, Some(index), new_name)?;
        let mut touched = 0;
        for txn in budget.transactions.iter_mut().filter(|t| t.account == current) {
            txn.account = new_name.clone();
            touched += 1;
        }
        debug!(from = current, to = %new_name, touched, "account renamed");
        budget.accounts[index] = new_name;
        Ok(touched)
    }

    /// Removes an account when no transaction references it.
    pub fn remove(budget: &mut Budget, name: &str) -> CoreResult<()> {
        let index = Self::position(budget, name)?;
        if budget.transactions.iter().any(|txn| txn.account == name) {
            return Err(CoreError::Validation(format!(
                "Account `{name}` has linked transactions"
            )));
        }
        budget.accounts.remove(index);
        debug!(account = name, "account removed");
        Ok(())
    }

    /// Returns a snapshot of the accounts currently tracked.
    pub fn list(budget: &Budget) -> Vec<&str> {
        budget.accounts.iter().map(String::as_str).collect()
    }

    fn position(budget: &Budget, name: &str) -> CoreResult<usize> {
        budget
            .accounts
            .iter()
            .position(|account| account == name)
            .ok_or_else(|| CoreError::AccountNotFound(name.to_string()))
    }

    fn validate_name(budget: &Budget, exclude: Option<usize>, candidate: &str) -> CoreResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Account name cannot be empty".into()));
        }
        let normalized = trimmed.to_lowercase();
        let duplicate = budget.accounts.iter().enumerate().any(|(idx, account)| {
            account.trim().to_lowercase() == normalized && exclude != Some(idx)
        });
        if duplicate {
            Err(CoreError::Validation(format!(
                "Account `{trimmed}` already exists"
            )))
        } else {
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use budget_domain::Transaction;
    use chrono::NaiveDate;

    use super::*;

    fn budget() -> Budget {
        let mut budget = Budget::new("2025-10".parse().unwrap());
        budget.accounts.push("Checking".into());
        budget
    }

    #[test]
    fn add_rejects_duplicates_and_blank_names() {
        let mut budget = budget();
        let err = AccountService::add(&mut budget, " checking ").expect_err("duplicate");
        assert!(
            matches!(err, CoreError::Validation(ref message) if message.contains("already exists")),
            "unexpected error: {err:?}"
        );
        assert!(AccountService::add(&mut budget, "   ").is_err());
        AccountService::add(&mut budget, " Cash ").unwrap();
        assert_eq!(AccountService::list(&budget), vec!["Checking", "Cash"]);
    }

    #[test]
    fn rename_cascades_to_transactions() {
        let mut budget = budget();
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        budget
            .transactions
            .push(Transaction::new(date, "Checking", "Food", 100));
        let touched = AccountService::rename(&mut budget, "Checking", "Main").unwrap();
        assert_eq!(touched, 1);
        assert_eq!(budget.transactions[0].account, "Main");
        assert!(budget.has_account("Main"));
    }

    #[test]
    fn remove_blocks_accounts_in_use() {
        let mut budget = budget();
        let date = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        budget
            .transactions
            .push(Transaction::new(date, "Checking", "Food", 100));
        assert!(AccountService::remove(&mut budget, "Checking").is_err());
        budget.transactions.clear();
        AccountService::remove(&mut budget, "Checking").unwrap();
        assert!(budget.accounts.is_empty());
        assert!(matches!(
            AccountService::remove(&mut budget, "Checking"),
            Err(CoreError::AccountNotFound(_))
        ));
    }
}
