//! The budget store document and its lookup helpers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    category::{Category, CategoryGroup},
    period::YearMonth,
    recurring::RecurringTemplate,
    transaction::Transaction,
};

pub const DEFAULT_ACCOUNTS: [&str; 4] = ["Checking", "Savings", "Cash", "Joint"];

pub const DEFAULT_CATEGORIES: [(&str, CategoryGroup); 16] = [
    ("Salary", CategoryGroup::Income),
    ("Other income", CategoryGroup::Income),
    ("Rent / mortgage", CategoryGroup::Needs),
    ("Utilities", CategoryGroup::Needs),
    ("Groceries", CategoryGroup::Needs),
    ("Transport", CategoryGroup::Needs),
    ("Insurance", CategoryGroup::Needs),
    ("Health", CategoryGroup::Needs),
    ("Dining out", CategoryGroup::Wants),
    ("Entertainment", CategoryGroup::Wants),
    ("Shopping", CategoryGroup::Wants),
    ("Subscriptions", CategoryGroup::Wants),
    ("Emergency fund", CategoryGroup::Savings),
    ("Retirement", CategoryGroup::Savings),
    ("Travel fund", CategoryGroup::Savings),
    ("Home & car upkeep", CategoryGroup::Savings),
];

/// Everything the budget tracks: the selected period plus every record.
///
/// Field order is the serialized order of persisted and exported documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(alias = "month")]
    pub period: YearMonth,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default, alias = "recurrings")]
    pub recurring_templates: Vec<RecurringTemplate>,
}

impl Budget {
    /// Creates an empty budget scoped to `period`.
    pub fn new(period: YearMonth) -> Self {
        Self {
            period,
            accounts: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            recurring_templates: Vec::new(),
        }
    }

    /// Creates a budget seeded with the default accounts and categories.
    pub fn with_defaults(period: YearMonth) -> Self {
        let mut budget = Self::new(period);
        budget.accounts = DEFAULT_ACCOUNTS.iter().map(|name| name.to_string()).collect();
        budget.categories = DEFAULT_CATEGORIES
            .iter()
            .map(|(name, group)| Category::new(*name, *group))
            .collect();
        budget
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|category| category.name == name)
    }

    /// Resolves the group of a category name; `None` for unknown names and the
    /// uncategorized sentinel.
    pub fn group_of(&self, category: &str) -> Option<CategoryGroup> {
        self.category(category).map(|category| category.group)
    }

    pub fn has_account(&self, name: &str) -> bool {
        self.accounts.iter().any(|account| account == name)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn template(&self, id: Uuid) -> Option<&RecurringTemplate> {
        self.recurring_templates
            .iter()
            .find(|template| template.id == id)
    }

    pub fn template_mut(&mut self, id: Uuid) -> Option<&mut RecurringTemplate> {
        self.recurring_templates
            .iter_mut()
            .find(|template| template.id == id)
    }

    /// Amount with the sign implied by the category group: income positive,
    /// everything else negative.
    pub fn signed_amount(&self, txn: &Transaction) -> i64 {
        let magnitude = i64::try_from(txn.amount).unwrap_or(i64::MAX);
        match self.group_of(&txn.category) {
            Some(CategoryGroup::Income) => magnitude,
            _ => -magnitude,
        }
    }
}
