use std::{collections::HashSet, sync::Mutex};

use budget_domain::{Budget, UNCATEGORIZED};

use crate::CoreError;

/// Opaque blob store holding the serialized budget document.
///
/// The session reads the blob once at startup and writes it after every
/// mutation; backends never interpret its contents.
pub trait BudgetStorage: Send + Sync {
    /// Returns the stored blob, or `None` when nothing has been saved yet.
    fn load_blob(&self) -> Result<Option<String>, CoreError>;
    fn save_blob(&self, blob: &str) -> Result<(), CoreError>;
}

/// In-process storage used for ephemeral sessions and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn snapshot(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

impl BudgetStorage for MemoryStorage {
    fn load_blob(&self) -> Result<Option<String>, CoreError> {
        self.blob
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))
    }

    fn save_blob(&self, blob: &str) -> Result<(), CoreError> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| CoreError::Storage("memory storage lock poisoned".into()))?;
        *guard = Some(blob.to_string());
        Ok(())
    }
}

/// Detects dangling references within a budget snapshot.
pub fn budget_warnings(budget: &Budget) -> Vec<String> {
    let accounts: HashSet<_> = budget.accounts.iter().map(String::as_str).collect();
    let categories: HashSet<_> = budget
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    let mut warnings = Vec::new();

    for txn in &budget.transactions {
        if !txn.account.is_empty() && !accounts.contains(txn.account.as_str()) {
            warnings.push(format!(
                "transaction {} references unknown account `{}`",
                txn.id, txn.account
            ));
        }
        if txn.category != UNCATEGORIZED && !categories.contains(txn.category.as_str()) {
            warnings.push(format!(
                "transaction {} references missing category `{}`",
                txn.id, txn.category
            ));
        }
    }
    for template in &budget.recurring_templates {
        if template.category != UNCATEGORIZED && !categories.contains(template.category.as_str()) {
            warnings.push(format!(
                "recurring template `{}` references missing category `{}`",
                template.name, template.category
            ));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use budget_domain::{Category, CategoryGroup, Transaction};
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn memory_storage_round_trips_blob() {
        let storage = MemoryStorage::new();
        assert!(storage.load_blob().unwrap().is_none());
        storage.save_blob("{}").unwrap();
        assert_eq!(storage.load_blob().unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn warnings_flag_unknown_references_but_not_sentinel() {
        let mut budget = Budget::new("2025-10".parse().unwrap());
        budget.accounts.push("Checking".into());
        budget
            .categories
            .push(Category::new("Food", CategoryGroup::Needs));
        let date = NaiveDate::from_ymd_opt(2025, 10, 9).unwrap();
        budget
            .transactions
            .push(Transaction::new(date, "Checking", "Food", 980));
        budget
            .transactions
            .push(Transaction::new(date, "Checking", UNCATEGORIZED, 10));
        budget
            .transactions
            .push(Transaction::new(date, "Wallet", "Toys", 10));

        let warnings = budget_warnings(&budget);
        assert_eq!(warnings.len(), 2, "{warnings:?}");
        assert!(warnings[0].contains("Wallet"));
        assert!(warnings[1].contains("Toys"));
    }
}
