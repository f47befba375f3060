//! Recurring payment templates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{common::*, period::YearMonth};

/// Reusable definition of an expected monthly transaction. A template is not a
/// transaction itself; confirming it records one tagged with the template id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurringTemplate {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(deserialize_with = "deserialize_magnitude")]
    pub amount: u64,
    #[serde(default = "RecurringTemplate::default_day")]
    pub day: u32,
    #[serde(default = "RecurringTemplate::default_active")]
    pub active: bool,
}

impl RecurringTemplate {
    pub fn new(name: impl Into<String>, category: impl Into<String>, amount: u64, day: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            amount,
            day,
            active: true,
        }
    }

    pub fn default_day() -> u32 {
        1
    }

    pub fn default_active() -> bool {
        true
    }

    /// Day-of-month this template falls on within `period`.
    pub fn clamped_day(&self, period: YearMonth) -> u32 {
        self.day.clamp(1, period.days())
    }

    /// Calendar date this template falls on within `period`.
    pub fn due_date(&self, period: YearMonth) -> NaiveDate {
        period.date(self.clamped_day(period))
    }
}

impl Identifiable for RecurringTemplate {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for RecurringTemplate {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Amounted for RecurringTemplate {
    fn amount(&self) -> u64 {
        self.amount
    }
}

/// Partial update for a [`RecurringTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringTemplatePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub amount: Option<u64>,
    pub day: Option<u32>,
    pub active: Option<bool>,
}

impl RecurringTemplatePatch {
    pub fn apply(&self, base: &RecurringTemplate) -> RecurringTemplate {
        let mut next = base.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(category) = &self.category {
            next.category = category.clone();
        }
        if let Some(amount) = self.amount {
            next.amount = amount;
        }
        if let Some(day) = self.day {
            next.day = day;
        }
        if let Some(active) = self.active {
            next.active = active;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_date_clamps_to_short_months() {
        let template = RecurringTemplate::new("Rent", "Rent", 11500, 31);
        let february: YearMonth = "2025-02".parse().unwrap();
        assert_eq!(template.clamped_day(february), 28);
        assert_eq!(
            template.due_date(february),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
    }

    #[test]
    fn missing_flags_default_to_active_first_day() {
        let raw = r#"{"name": "Gym", "category": "Health", "amount": 790}"#;
        let template: RecurringTemplate = serde_json::from_str(raw).unwrap();
        assert!(template.active);
        assert_eq!(template.day, 1);
    }
}
