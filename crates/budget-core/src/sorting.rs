//! Sort state and ordering for transaction listings.

use std::{cmp::Ordering, fmt, str::FromStr};

use budget_domain::{Budget, Transaction};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Date,
    Account,
    Category,
    /// Signed amount: income positive, expenses negative.
    Amount,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Date,
        SortKey::Account,
        SortKey::Category,
        SortKey::Amount,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Account => "account",
            SortKey::Category => "category",
            SortKey::Amount => "amount",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| CoreError::Validation(format!("Unknown sort key `{value}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Current ordering of the transaction table. Starts on date, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    /// Selecting the active key flips direction; any other key starts ascending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Stable sort of `transactions` according to `state`.
pub fn sort_transactions(budget: &Budget, transactions: &mut [&Transaction], state: SortState) {
    transactions.sort_by(|a, b| {
        let ordering = compare_by_key(budget, a, b, state.key);
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare_by_key(budget: &Budget, a: &Transaction, b: &Transaction, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Account => locale_compare(&a.account, &b.account),
        SortKey::Category => locale_compare(&a.category, &b.category),
        SortKey::Amount => budget.signed_amount(a).cmp(&budget.signed_amount(b)),
    }
}

/// Compares text the way a person reading the list expects: accents and case
/// are ignored first, then the raw strings break ties.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().map(fold_char).flat_map(char::to_lowercase);
    let folded_b = b.chars().map(fold_char).flat_map(char::to_lowercase);
    folded_a
        .cmp(folded_b)
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ą' => 'a',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ą' => 'A',
        'č' | 'ç' | 'ć' => 'c',
        'Č' | 'Ç' | 'Ć' => 'C',
        'ď' => 'd',
        'Ď' => 'D',
        'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ę' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' | 'Ě' | 'Ę' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ľ' | 'ĺ' | 'ł' => 'l',
        'Ľ' | 'Ĺ' | 'Ł' => 'L',
        'ň' | 'ñ' | 'ń' => 'n',
        'Ň' | 'Ñ' | 'Ń' => 'N',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' => 'O',
        'ř' | 'ŕ' => 'r',
        'Ř' | 'Ŕ' => 'R',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ť' => 't',
        'Ť' => 'T',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ů' => 'U',
        'ý' | 'ÿ' => 'y',
        'Ý' | 'Ÿ' => 'Y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        other => other,
    }
}
