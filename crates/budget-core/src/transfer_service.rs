//! JSON export and partial import of the whole budget document.

use std::{collections::HashSet, fmt};

use budget_domain::{
    amount_out_of_range, Budget, Category, RecurringTemplate, Transaction, YearMonth, MAX_AMOUNT,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::{CoreError, CoreResult};

/// Import payload. Every field is optional; absent or `null` fields leave
/// the corresponding part of the store untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetDocument {
    #[serde(default, alias = "month", skip_serializing_if = "Option::is_none")]
    pub period: Option<YearMonth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, alias = "recurrings", skip_serializing_if = "Option::is_none")]
    pub recurring_templates: Option<Vec<RecurringTemplate>>,
}

impl BudgetDocument {
    pub fn is_empty(&self) -> bool {
        self == &BudgetDocument::default()
    }
}

impl From<Budget> for BudgetDocument {
    fn from(budget: Budget) -> Self {
        Self {
            period: Some(budget.period),
            accounts: Some(budget.accounts),
            categories: Some(budget.categories),
            transactions: Some(budget.transactions),
            recurring_templates: Some(budget.recurring_templates),
        }
    }
}

/// What an import replaced. `None` means the field was not in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub period: Option<YearMonth>,
    pub accounts: Option<usize>,
    pub categories: Option<usize>,
    pub transactions: Option<usize>,
    pub recurring_templates: Option<usize>,
}

impl ImportSummary {
    pub fn is_empty(&self) -> bool {
        self == &ImportSummary::default()
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(period) = self.period {
            parts.push(format!("period {period}"));
        }
        let counts = [
            ("accounts", self.accounts),
            ("categories", self.categories),
            ("transactions", self.transactions),
            ("recurring templates", self.recurring_templates),
        ];
        for (label, count) in counts {
            if let Some(count) = count {
                parts.push(format!("{count} {label}"));
            }
        }
        if parts.is_empty() {
            f.write_str("nothing to import")
        } else {
            write!(f, "imported {}", parts.join(", "))
        }
    }
}

pub struct TransferService;

impl TransferService {
    /// Serializes the full store as pretty-printed JSON with stable field order.
    pub fn export_json(budget: &Budget) -> CoreResult<String> {
        let json = serde_json::to_string_pretty(budget)?;
        info!(
            period = %budget.period,
            transactions = budget.transactions.len(),
            "budget exported"
        );
        Ok(json)
    }

    /// Default file name offered for an export of `period`.
    pub fn export_file_name(period: YearMonth) -> String {
        format!("budget-{period}.json")
    }

    /// Parses and validates an import document without touching any store.
    pub fn parse_document(raw: &str) -> CoreResult<BudgetDocument> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| CoreError::Import(format!("invalid JSON: {err}")))?;
        if !value.is_object() {
            return Err(CoreError::Import(
                "expected a JSON object at the top level".into(),
            ));
        }
        let legacy = legacy_markers(&value);
        if !legacy.is_empty() {
            warn!(markers = ?legacy, "normalizing legacy budget document");
        }
        let document: BudgetDocument =
            serde_json::from_value(value).map_err(|err| CoreError::Import(err.to_string()))?;
        validate_document(&document)?;
        Ok(document)
    }

    /// Replaces every store field present in `document`.
    pub fn apply_document(budget: &mut Budget, document: BudgetDocument) -> ImportSummary {
        let mut summary = ImportSummary::default();
        if let Some(period) = document.period {
            budget.period = period;
            summary.period = Some(period);
        }
        if let Some(accounts) = document.accounts {
            summary.accounts = Some(accounts.len());
            budget.accounts = accounts;
        }
        if let Some(categories) = document.categories {
            summary.categories = Some(categories.len());
            budget.categories = categories;
        }
        if let Some(transactions) = document.transactions {
            summary.transactions = Some(transactions.len());
            budget.transactions = transactions;
        }
        if let Some(templates) = document.recurring_templates {
            summary.recurring_templates = Some(templates.len());
            budget.recurring_templates = templates;
        }
        summary
    }

    /// Parses `raw` and applies it. On any error the store is unchanged.
    pub fn import_json(budget: &mut Budget, raw: &str) -> CoreResult<ImportSummary> {
        let document = Self::parse_document(raw)?;
        let summary = Self::apply_document(budget, document);
        info!(%summary, "budget imported");
        Ok(summary)
    }
}

fn validate_document(document: &BudgetDocument) -> CoreResult<()> {
    if let Some(accounts) = &document.accounts {
        if accounts.iter().any(|account| account.trim().is_empty()) {
            return Err(CoreError::Import("account names cannot be empty".into()));
        }
    }
    if let Some(categories) = &document.categories {
        let mut seen = HashSet::new();
        for category in categories {
            let name = category.name.trim();
            if name.is_empty() {
                return Err(CoreError::Import("category names cannot be empty".into()));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(CoreError::Import(format!("duplicate category `{name}`")));
            }
        }
    }
    if let Some(transactions) = &document.transactions {
        if let Some(txn) = transactions.iter().find(|txn| txn.amount > MAX_AMOUNT) {
            return Err(CoreError::Import(format!(
                "transaction {}: {}",
                txn.id,
                amount_out_of_range(txn.amount)
            )));
        }
    }
    if let Some(templates) = &document.recurring_templates {
        for template in templates {
            if template.amount > MAX_AMOUNT {
                return Err(CoreError::Import(format!(
                    "recurring template `{}`: {}",
                    template.name,
                    amount_out_of_range(template.amount)
                )));
            }
            if template.name.trim().is_empty() {
                return Err(CoreError::Import(
                    "recurring template names cannot be empty".into(),
                ));
            }
            if !(1..=31).contains(&template.day) {
                return Err(CoreError::Import(format!(
                    "recurring template `{}` has invalid day {}",
                    template.name, template.day
                )));
            }
        }
    }
    Ok(())
}

/// Keys and values that only older documents carry.
fn legacy_markers(value: &Value) -> Vec<&'static str> {
    let mut markers = Vec::new();
    if value.get("month").is_some() {
        markers.push("month");
    }
    if value.get("recurrings").is_some() {
        markers.push("recurrings");
    }
    let transactions = value
        .get("transactions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if transactions.iter().any(|txn| txn.get("metaRecurringId").is_some()) {
        markers.push("metaRecurringId");
    }
    let negative = transactions.iter().any(|txn| {
        txn.get("amount")
            .and_then(Value::as_f64)
            .is_some_and(|amount| amount < 0.0)
    });
    if negative {
        markers.push("signed amounts");
    }
    markers
}

#[cfg(test)]
mod tests {
    use budget_domain::CategoryGroup;
    use chrono::NaiveDate;

    use super::*;

    fn october() -> YearMonth {
        "2025-10".parse().unwrap()
    }

    fn budget() -> Budget {
        let mut budget = Budget::with_defaults(october());
        let date = NaiveDate::from_ymd_opt(2025, 10, 7).unwrap();
        budget
            .transactions
            .push(Transaction::new(date, "Checking", "Groceries", 980));
        budget
    }

    #[test]
    fn export_then_import_restores_store() {
        let original = budget();
        let json = TransferService::export_json(&original).unwrap();
        let mut target = Budget::new("2020-01".parse().unwrap());
        TransferService::import_json(&mut target, &json).unwrap();
        assert_eq!(target, original);
    }

    #[test]
    fn partial_document_replaces_only_present_fields() {
        let mut budget = budget();
        let before = budget.clone();
        let raw = r#"{"transactions": [{"date": "2025-10-20", "account": "Cash",
            "category": "Dining out", "amount": 450}], "accounts": null}"#;
        let summary = TransferService::import_json(&mut budget, raw).unwrap();
        assert_eq!(summary.transactions, Some(1));
        assert!(summary.accounts.is_none());
        assert_eq!(budget.accounts, before.accounts);
        assert_eq!(budget.categories, before.categories);
        assert_eq!(budget.period, before.period);
        assert_eq!(budget.transactions.len(), 1);
        assert_eq!(budget.transactions[0].amount, 450);
    }

    #[test]
    fn malformed_input_leaves_store_untouched() {
        let mut budget = budget();
        let before = budget.clone();
        for raw in [
            "not json",
            "[1, 2]",
            r#"{"period": "2025-13"}"#,
            r#"{"categories": [{"name": "X", "group": "Luxury"}]}"#,
            r#"{"categories": [{"name": "X"}, {"name": "x"}]}"#,
            r#"{"transactions": [{"date": "2025-10-40", "amount": 1}]}"#,
            r#"{"transactions": [{"date": "2025-10-01", "amount": "lots"}]}"#,
            r#"{"recurringTemplates": [{"name": "Rent", "amount": 1, "day": 40}]}"#,
        ] {
            let err = TransferService::import_json(&mut budget, raw).expect_err(raw);
            assert!(matches!(err, CoreError::Import(_)), "unexpected error: {err:?}");
        }
        assert_eq!(budget, before);
    }

    #[test]
    fn legacy_documents_are_normalized() {
        let raw = r#"{
            "month": "2025-09",
            "categories": [{"name": "Nájem", "group": "Potřeby"}, {"name": "Misc"}],
            "transactions": [{"date": "2025-09-01", "category": "Nájem", "amount": -11500}],
            "recurrings": [{"name": "Rent", "category": "Nájem", "amount": 11500, "day": 1}]
        }"#;
        let document = TransferService::parse_document(raw).unwrap();
        assert_eq!(document.period, Some("2025-09".parse().unwrap()));
        let categories = document.categories.as_ref().unwrap();
        assert_eq!(categories[0].group, CategoryGroup::Needs);
        assert_eq!(categories[1].group, CategoryGroup::Needs);
        assert_eq!(document.transactions.as_ref().unwrap()[0].amount, 11500);
        assert_eq!(document.recurring_templates.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn export_file_name_uses_period() {
        assert_eq!(TransferService::export_file_name(october()), "budget-2025-10.json");
    }

    #[test]
    fn summary_describes_replaced_fields() {
        let summary = ImportSummary {
            transactions: Some(3),
            ..ImportSummary::default()
        };
        assert_eq!(summary.to_string(), "imported 3 transactions");
        assert_eq!(ImportSummary::default().to_string(), "nothing to import");
    }

    #[test]
    fn amounts_beyond_the_signed_range_are_rejected() {
        let mut store = budget();
        let before = store.clone();
        let raw = format!(
            r#"{{"transactions":[{{"date":"2025-10-03","account":"Checking","category":"Groceries","amount":{}}}]}}"#,
            u64::MAX
        );
        let err = TransferService::import_json(&mut store, &raw).unwrap_err();
        assert!(matches!(err, CoreError::Import(ref message) if message.contains("exceeds")));
        assert_eq!(store, before);
    }
}
