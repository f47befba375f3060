use budget_config::Config;
use budget_core::{CurrencyFormatter, DateFormatter};
use chrono::NaiveDate;

/// Locale-aware formatter implementations built from the active configuration.
#[derive(Debug, Clone)]
pub struct CliFormatters {
    currency: String,
    grouping: char,
    day_first: bool,
}

impl CliFormatters {
    pub fn from_config(config: &Config) -> Self {
        let language = config
            .locale
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let grouping = match language.as_str() {
            "cs" | "sk" | "pl" | "fr" | "sv" | "fi" => ' ',
            "de" | "it" | "es" | "nl" | "pt" => '.',
            _ => ',',
        };
        Self {
            currency: config.currency.clone(),
            grouping,
            day_first: language != "en",
        }
    }
}

impl CurrencyFormatter for CliFormatters {
    fn format_amount(&self, amount: i64) -> String {
        let digits = amount.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(self.grouping);
            }
            grouped.push(ch);
        }
        let sign = if amount < 0 { "-" } else { "" };
        format!("{sign}{grouped} {}", self.currency)
    }
}

impl DateFormatter for CliFormatters {
    fn format_date(&self, date: NaiveDate) -> String {
        if self.day_first {
            date.format("%d.%m.%Y").to_string()
        } else {
            date.format("%Y-%m-%d").to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formatters(locale: &str, currency: &str) -> CliFormatters {
        let config = Config {
            locale: locale.into(),
            currency: currency.into(),
            ..Config::default()
        };
        CliFormatters::from_config(&config)
    }

    #[test]
    fn amounts_are_grouped_per_locale() {
        assert_eq!(formatters("cs-CZ", "CZK").format_amount(34137), "34 137 CZK");
        assert_eq!(formatters("en-US", "USD").format_amount(-1234567), "-1,234,567 USD");
        assert_eq!(formatters("de-DE", "EUR").format_amount(980), "980 EUR");
    }

    #[test]
    fn dates_follow_locale_order() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        assert_eq!(formatters("cs-CZ", "CZK").format_date(date), "06.10.2025");
        assert_eq!(formatters("en-US", "USD").format_date(date), "2025-10-06");
    }
}
