//! Domain types representing budget categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::common::*;

/// Categorises transactions for aggregation. The name is the join key used by
/// transactions and recurring templates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_group")]
    pub group: CategoryGroup,
}

/// `null` and blank labels fall back to the default group.
fn deserialize_group<'de, D>(deserializer: D) -> Result<CategoryGroup, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(label) if !label.trim().is_empty() => {
            label.parse().map_err(serde::de::Error::custom)
        }
        _ => Ok(CategoryGroup::default()),
    }
}

impl Category {
    pub fn new(name: impl Into<String>, group: CategoryGroup) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Budget groups a category can belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum CategoryGroup {
    #[serde(alias = "Příjem")]
    Income,
    #[default]
    #[serde(alias = "Potřeby")]
    Needs,
    #[serde(alias = "Přání")]
    Wants,
    #[serde(alias = "Úspory")]
    Savings,
}

impl CategoryGroup {
    pub const ALL: [CategoryGroup; 4] = [
        CategoryGroup::Income,
        CategoryGroup::Needs,
        CategoryGroup::Wants,
        CategoryGroup::Savings,
    ];

    pub fn is_income(self) -> bool {
        matches!(self, CategoryGroup::Income)
    }

    pub fn is_expense(self) -> bool {
        !self.is_income()
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryGroup::Income => "Income",
            CategoryGroup::Needs => "Needs",
            CategoryGroup::Wants => "Wants",
            CategoryGroup::Savings => "Savings",
        };
        f.write_str(label)
    }
}

impl FromStr for CategoryGroup {
    type Err = UnknownGroup;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "income" | "příjem" => Ok(CategoryGroup::Income),
            "needs" | "potřeby" => Ok(CategoryGroup::Needs),
            "wants" | "přání" => Ok(CategoryGroup::Wants),
            "savings" | "úspory" => Ok(CategoryGroup::Savings),
            _ => Err(UnknownGroup(value.trim().to_string())),
        }
    }
}

/// Returned when a label does not name a [`CategoryGroup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGroup(pub String);

impl fmt::Display for UnknownGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown group `{}` (expected Income, Needs, Wants or Savings)",
            self.0
        )
    }
}

impl std::error::Error for UnknownGroup {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_parses_english_and_legacy_labels() {
        assert_eq!("income".parse::<CategoryGroup>(), Ok(CategoryGroup::Income));
        assert_eq!(" Wants ".parse::<CategoryGroup>(), Ok(CategoryGroup::Wants));
        assert_eq!("Úspory".parse::<CategoryGroup>(), Ok(CategoryGroup::Savings));
        assert!("Fixed".parse::<CategoryGroup>().is_err());
    }

    #[test]
    fn missing_group_defaults_to_needs() {
        let category: Category = serde_json::from_str(r#"{"name": "Rent"}"#).unwrap();
        assert_eq!(category.group, CategoryGroup::Needs);

        let legacy: Category =
            serde_json::from_str(r#"{"name": "Mzda", "group": "Příjem", "envelope": 0}"#).unwrap();
        assert_eq!(legacy.group, CategoryGroup::Income);
    }

    #[test]
    fn null_or_blank_group_defaults_to_needs() {
        for raw in [
            r#"{"name": "Rent", "group": null}"#,
            r#"{"name": "Rent", "group": ""}"#,
            r#"{"name": "Rent", "group": "  "}"#,
        ] {
            let category: Category = serde_json::from_str(raw).unwrap();
            assert_eq!(category.group, CategoryGroup::Needs, "input: {raw}");
        }

        let err = serde_json::from_str::<Category>(r#"{"name": "Rent", "group": "Fixed"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("unknown group"));
    }
}
