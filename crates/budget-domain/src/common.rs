//! Shared traits, constants, and serde helpers for budgeting primitives.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use uuid::Uuid;

/// Category name assigned to transactions whose category was deleted.
pub const UNCATEGORIZED: &str = "-";

/// Largest accepted amount in minor units. Signed views of an amount must fit
/// in `i64`.
pub const MAX_AMOUNT: u64 = i64::MAX as u64;

/// Validation message for amounts above [`MAX_AMOUNT`].
pub fn amount_out_of_range(amount: u64) -> String {
    format!("Amount {amount} exceeds the maximum of {MAX_AMOUNT}")
}

/// Exposes a stable identifier for entities stored in the budget.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Provides read-only access to an entity's display name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a common contract for retrieving unsigned amounts in minor units.
pub trait Amounted {
    fn amount(&self) -> u64;
}

/// Deserializes an amount as its unsigned magnitude.
///
/// Older documents stored expenses as negative numbers and some stored
/// amounts as strings or fractional values; all of them collapse to a rounded
/// magnitude here.
pub fn deserialize_magnitude<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(MagnitudeVisitor)
}

struct MagnitudeVisitor;

impl<'de> Visitor<'de> for MagnitudeVisitor {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric amount")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
        Ok(value)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u64, E> {
        Ok(value.unsigned_abs())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<u64, E> {
        if !value.is_finite() || value.abs() > u64::MAX as f64 {
            return Err(E::custom(format!("amount `{value}` is out of range")));
        }
        Ok(value.abs().round() as u64)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("amount `{value}` is not numeric")))?;
        self.visit_f64(parsed)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::deserialize_magnitude")]
        amount: u64,
    }

    fn parse(raw: &str) -> Result<u64, serde_json::Error> {
        serde_json::from_str::<Holder>(raw).map(|holder| holder.amount)
    }

    #[test]
    fn signed_and_fractional_amounts_become_magnitudes() {
        assert_eq!(parse(r#"{"amount": 1200}"#).unwrap(), 1200);
        assert_eq!(parse(r#"{"amount": -11500}"#).unwrap(), 11500);
        assert_eq!(parse(r#"{"amount": 99.6}"#).unwrap(), 100);
        assert_eq!(parse(r#"{"amount": "250"}"#).unwrap(), 250);
    }

    #[test]
    fn non_numeric_amount_is_rejected() {
        assert!(parse(r#"{"amount": "lots"}"#).is_err());
        assert!(parse(r#"{"amount": true}"#).is_err());
    }
}
