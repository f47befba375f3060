//! Domain models for budget transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// A single recorded movement of money.
///
/// `amount` is always an unsigned magnitude in minor units; whether it counts
/// as income or expense follows from the category's group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "uncategorized")]
    pub category: String,
    #[serde(deserialize_with = "deserialize_magnitude")]
    pub amount: u64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        alias = "metaRecurringId"
    )]
    pub recurring_ref: Option<Uuid>,
}

fn uncategorized() -> String {
    UNCATEGORIZED.to_string()
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        account: impl Into<String>,
        category: impl Into<String>,
        amount: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            account: account.into(),
            description: String::new(),
            category: category.into(),
            amount,
            recurring_ref: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_recurring_ref(mut self, template_id: Uuid) -> Self {
        self.recurring_ref = Some(template_id);
        self
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for Transaction {
    fn amount(&self) -> u64 {
        self.amount
    }
}

/// Partial update for a [`Transaction`]; only populated fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub account: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<u64>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self == &TransactionPatch::default()
    }

    /// Returns a copy of `base` with the patch applied.
    pub fn apply(&self, base: &Transaction) -> Transaction {
        let mut next = base.clone();
        if let Some(date) = self.date {
            next.date = date;
        }
        if let Some(account) = &self.account {
            next.account = account.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(category) = &self.category {
            next.category = category.clone();
        }
        if let Some(amount) = self.amount {
            next.amount = amount;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_present_fields() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 7).unwrap();
        let base = Transaction::new(date, "Checking", "Housing", 11500).with_description("Rent");
        let patch = TransactionPatch {
            amount: Some(12000),
            ..TransactionPatch::default()
        };
        let next = patch.apply(&base);
        assert_eq!(next.amount, 12000);
        assert_eq!(next.description, "Rent");
        assert_eq!(next.id, base.id);
        assert!(TransactionPatch::default().is_empty());
    }

    #[test]
    fn legacy_fields_are_understood() {
        let raw = r#"{
            "id": "6f1f4a54-7f2b-4f55-9d5b-3b0d7c1d8a11",
            "date": "2025-10-07",
            "account": "Checking",
            "description": "Rent",
            "category": "Housing",
            "amount": -11500,
            "metaRecurringId": "0b8e9f0e-2f67-4c7e-9b0e-5a1f3e6d2c44"
        }"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert_eq!(txn.amount, 11500);
        assert!(txn.recurring_ref.is_some());

        let json = serde_json::to_string(&txn).unwrap();
        assert!(json.contains("\"recurringRef\""));
    }

    #[test]
    fn missing_id_and_category_get_defaults() {
        let raw = r#"{"date": "2025-10-09", "amount": 980}"#;
        let txn: Transaction = serde_json::from_str(raw).unwrap();
        assert!(!txn.id.is_nil());
        assert!(txn.is_uncategorized());
    }
}
