//! Business logic helpers for category management.

use std::collections::HashSet;

use budget_domain::{Budget, Category, CategoryGroup, Transaction, UNCATEGORIZED};
use tracing::debug;

use crate::{CoreError, CoreResult};

/// Provides validated operations for [`Category`] entities.
///
/// Categories are joined by name, so renames and removals rewrite the
/// references held by transactions and recurring templates.
pub struct CategoryService;

impl CategoryService {
    /// Adds a new category and ensures its name is valid and unique.
    pub fn add(budget: &mut Budget, category: Category) -> CoreResult<()> {
        let name = Self::validate_name(budget, None, &category.name)?;
        debug!(category = %name, group = %category.group, "category added");
        budget.categories.push(Category::new(name, category.group));
        Ok(())
    }

    /// Renames a category, rewriting transaction and template references.
    /// Returns the number of transactions touched.
    pub fn rename(budget: &mut Budget, current: &str, new_name: &str) -> CoreResult<usize> {
        let index = Self::position(budget, current)?;
        let new_name = Self::validate_name(budget, Some(index), new_name)?;
        let mut touched = 0;
        for txn in budget
            .transactions
            .iter_mut()
            .filter(|txn| txn.category == current)
        {
            txn.category = new_name.clone();
            touched += 1;
        }
        for template in budget
            .recurring_templates
            .iter_mut()
            .filter(|template| template.category == current)
        {
            template.category = new_name.clone();
        }
        debug!(from = current, to = %new_name, touched, "category renamed");
        budget.categories[index].name = new_name;
        Ok(touched)
    }

    /// Moves a category into another group.
    pub fn set_group(budget: &mut Budget, name: &str, group: CategoryGroup) -> CoreResult<()> {
        let category = budget
            .category_mut(name)
            .ok_or_else(|| CoreError::CategoryNotFound(name.to_string()))?;
        category.group = group;
        debug!(category = name, %group, "category regrouped");
        Ok(())
    }

    /// Removes a category and remaps every reference to [`UNCATEGORIZED`].
    /// Returns the number of transactions remapped.
    pub fn remove(budget: &mut Budget, name: &str) -> CoreResult<usize> {
        let index = Self::position(budget, name)?;
        budget.categories.remove(index);
        let remapped = Self::remap_references(budget, &[name]);
        debug!(category = name, remapped, "category removed");
        Ok(remapped)
    }

    /// Replaces the whole category list, remapping references to names that
    /// no longer exist. Every entry is validated before anything changes.
    pub fn replace(budget: &mut Budget, next: Vec<Category>) -> CoreResult<usize> {
        let mut seen = HashSet::new();
        let mut cleaned = Vec::with_capacity(next.len());
        for category in next {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(CoreError::Validation("Category name cannot be empty".into()));
            }
            if name == UNCATEGORIZED {
                return Err(CoreError::Validation(format!(
                    "`{UNCATEGORIZED}` is reserved for uncategorized transactions"
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(CoreError::Validation(format!(
                    "Category `{name}` already exists"
                )));
            }
            cleaned.push(Category::new(name, category.group));
        }
        let kept: HashSet<&str> = cleaned.iter().map(|c| c.name.as_str()).collect();
        let removed: Vec<String> = budget
            .categories
            .iter()
            .filter(|category| !kept.contains(category.name.as_str()))
            .map(|category| category.name.clone())
            .collect();
        let removed_refs: Vec<&str> = removed.iter().map(String::as_str).collect();
        let remapped = Self::remap_references(budget, &removed_refs);
        budget.categories = cleaned;
        Ok(remapped)
    }

    /// Returns a snapshot of all categories.
    pub fn list(budget: &Budget) -> Vec<&Category> {
        budget.categories.iter().collect()
    }

    /// Lists the categories belonging to `group`, in list order.
    pub fn in_group(budget: &Budget, group: CategoryGroup) -> Vec<&Category> {
        budget
            .categories
            .iter()
            .filter(|category| category.group == group)
            .collect()
    }

    fn remap_references(budget: &mut Budget, removed: &[&str]) -> usize {
        if removed.is_empty() {
            return 0;
        }
        let remapped = remap_deleted_categories(&mut budget.transactions, removed);
        for template in budget
            .recurring_templates
            .iter_mut()
            .filter(|template| removed.contains(&template.category.as_str()))
        {
            template.category = UNCATEGORIZED.to_string();
        }
        remapped
    }

    fn position(budget: &Budget, name: &str) -> CoreResult<usize> {
        budget
            .categories
            .iter()
            .position(|category| category.name == name)
            .ok_or_else(|| CoreError::CategoryNotFound(name.to_string()))
    }

    fn validate_name(budget: &Budget, exclude: Option<usize>, candidate: &str) -> CoreResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Category name cannot be empty".into()));
        }
        if trimmed == UNCATEGORIZED {
            return Err(CoreError::Validation(format!(
                "`{UNCATEGORIZED}` is reserved for uncategorized transactions"
            )));
        }
        let normalized = trimmed.to_lowercase();
        let duplicate = budget.categories.iter().enumerate().any(|(idx, category)| {
            category.name.trim().to_lowercase() == normalized && exclude != Some(idx)
        });
        if duplicate {
            Err(CoreError::Validation(format!(
                "Category `{trimmed}` already exists"
            )))
        } else {
            Ok(trimmed.to_string())
        }
    }
}

/// Points every transaction whose category is in `removed` at
/// [`UNCATEGORIZED`], leaving the rest untouched. Returns how many changed.
pub fn remap_deleted_categories(transactions: &mut [Transaction], removed: &[&str]) -> usize {
    let removed: HashSet<&str> = removed.iter().copied().collect();
    let mut remapped = 0;
    for txn in transactions
        .iter_mut()
        .filter(|txn| removed.contains(txn.category.as_str()))
    {
        txn.category = UNCATEGORIZED.to_string();
        remapped += 1;
    }
    remapped
}

#[cfg(test)]
mod tests {
    use budget_domain::RecurringTemplate;
    use chrono::NaiveDate;

    use super::*;

    fn sample_budget() -> Budget {
        let mut budget = Budget::new("2025-10".parse().unwrap());
        budget.categories = vec![
            Category::new("A", CategoryGroup::Needs),
            Category::new("B", CategoryGroup::Wants),
            Category::new("C", CategoryGroup::Savings),
        ];
        let date = NaiveDate::from_ymd_opt(2025, 10, 3).unwrap();
        for name in ["A", "B", "C"] {
            budget
                .transactions
                .push(Transaction::new(date, "Checking", name, 10));
        }
        budget
            .recurring_templates
            .push(RecurringTemplate::new("Gym", "B", 790, 5));
        budget
    }

    #[test]
    fn remap_only_touches_deleted_names() {
        let mut budget = sample_budget();
        let changed = remap_deleted_categories(&mut budget.transactions, &["B", "Z"]);
        assert_eq!(changed, 1);
        let categories: Vec<_> = budget.transactions.iter().map(|t| t.category.as_str()).collect();
        assert_eq!(categories, vec!["A", "-", "C"]);
    }

    #[test]
    fn remove_remaps_transactions_and_templates() {
        let mut budget = sample_budget();
        let remapped = CategoryService::remove(&mut budget, "B").unwrap();
        assert_eq!(remapped, 1);
        assert!(budget.category("B").is_none());
        assert_eq!(budget.transactions[1].category, UNCATEGORIZED);
        assert_eq!(budget.recurring_templates[0].category, UNCATEGORIZED);
        assert_eq!(budget.transactions[0].category, "A");
    }

    #[test]
    fn add_rejects_duplicates_and_reserved_name() {
        let mut budget = sample_budget();
        let err = CategoryService::add(&mut budget, Category::new("a", CategoryGroup::Income))
            .expect_err("duplicate fails");
        assert!(
            matches!(err, CoreError::Validation(ref message) if message.contains("already exists")),
            "unexpected error: {err:?}"
        );
        assert!(CategoryService::add(&mut budget, Category::new("-", CategoryGroup::Needs)).is_err());
        assert!(CategoryService::add(&mut budget, Category::new(" ", CategoryGroup::Needs)).is_err());
        assert_eq!(budget.categories.len(), 3);
    }

    #[test]
    fn rename_rewrites_references() {
        let mut budget = sample_budget();
        let touched = CategoryService::rename(&mut budget, "B", "Fun").unwrap();
        assert_eq!(touched, 1);
        assert_eq!(budget.transactions[1].category, "Fun");
        assert_eq!(budget.recurring_templates[0].category, "Fun");
        assert!(CategoryService::rename(&mut budget, "A", "fun").is_err());
        assert!(matches!(
            CategoryService::rename(&mut budget, "Missing", "X"),
            Err(CoreError::CategoryNotFound(_))
        ));
    }

    #[test]
    fn replace_remaps_dropped_categories_only() {
        let mut budget = sample_budget();
        let next = vec![
            Category::new("A", CategoryGroup::Needs),
            Category::new("C", CategoryGroup::Income),
        ];
        let remapped = CategoryService::replace(&mut budget, next).unwrap();
        assert_eq!(remapped, 1);
        assert_eq!(budget.group_of("C"), Some(CategoryGroup::Income));
        assert_eq!(budget.transactions[1].category, UNCATEGORIZED);

        let invalid = vec![
            Category::new("A", CategoryGroup::Needs),
            Category::new("a", CategoryGroup::Needs),
        ];
        assert!(CategoryService::replace(&mut budget, invalid).is_err());
        assert_eq!(budget.categories.len(), 2);
    }
}
