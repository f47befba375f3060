use chrono::NaiveDate;

/// Formats signed amounts (minor units) for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: i64) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}
