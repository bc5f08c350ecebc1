//! Amount input type for the API boundary

use rust_decimal::prelude::*;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Format-checked amount accepted as a JSON number or a decimal string.
///
/// Only the lexical form is checked here; sign and precision are business
/// rules enforced by the engine (`InvalidAmount`).
///
/// Strings reject `.5`, `5.`, `+5`, scientific notation and thousands
/// separators. Numbers are taken by their shortest decimal representation,
/// so `0.1` stays `0.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    /// Get the inner Decimal value
    pub fn inner(self) -> Decimal {
        self.0
    }

    /// Create from Decimal (for testing)
    #[cfg(test)]
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn parse_strict<E: de::Error>(s: &str) -> Result<Decimal, E> {
    let s = s.trim();
    if s.is_empty() {
        return Err(E::custom("Amount cannot be empty"));
    }
    // Reject .5 format (must be 0.5)
    if s.starts_with('.') || s.starts_with("-.") {
        return Err(E::custom("Invalid format: use 0.5 not .5"));
    }
    // Reject 5. format (must be 5.0 or 5)
    if s.ends_with('.') {
        return Err(E::custom("Invalid format: use 5.0 not 5."));
    }
    if s.starts_with('+') {
        return Err(E::custom("Invalid format: + prefix not allowed"));
    }
    let body = s.strip_prefix('-').unwrap_or(s);
    if !body.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(E::custom(format!("Invalid amount: {}", s)));
    }
    Decimal::from_str(s).map_err(|e| E::custom(format!("Invalid decimal: {}", e)))
}

struct StrictDecimalVisitor;

impl<'de> Visitor<'de> for StrictDecimalVisitor {
    type Value = StrictDecimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a number or string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        parse_strict(v).map(StrictDecimal)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(StrictDecimal(Decimal::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(StrictDecimal(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom("Amount must be finite"));
        }
        // Display gives the shortest round-tripping form
        Decimal::from_str(&v.to_string())
            .or_else(|_| Decimal::from_scientific(&format!("{:e}", v)))
            .map(StrictDecimal)
            .map_err(|e| E::custom(format!("Invalid decimal: {}", e)))
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StrictDecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Decimal, serde_json::Error> {
        serde_json::from_str::<StrictDecimal>(json).map(StrictDecimal::inner)
    }

    #[test]
    fn test_accepts_numbers() {
        assert_eq!(parse("200").unwrap(), Decimal::from(200));
        assert_eq!(parse("0.1").unwrap(), Decimal::new(1, 1));
        assert_eq!(parse("1000.5").unwrap(), Decimal::new(10005, 1));
        // Sign is a business rule, not a format error
        assert_eq!(parse("-5").unwrap(), Decimal::from(-5));
    }

    #[test]
    fn test_accepts_strings() {
        assert_eq!(parse(r#""99.99""#).unwrap(), Decimal::new(9999, 2));
        assert_eq!(parse(r#"" 10 ""#).unwrap(), Decimal::from(10));
    }

    #[test]
    fn test_rejects_bad_strings() {
        for bad in [r#""""#, r#"".5""#, r#""5.""#, r#""+5""#, r#""1e3""#, r#""1,000""#, r#""abc""#] {
            assert!(parse(bad).is_err(), "should reject {}", bad);
        }
    }

    #[test]
    fn test_rejects_other_json_types() {
        assert!(parse("true").is_err());
        assert!(parse("null").is_err());
        assert!(parse("[1]").is_err());
    }

    #[test]
    fn test_precision_preserved_for_engine_check() {
        // Three decimals survive so the engine can reject them
        assert_eq!(parse("1.005").unwrap(), Decimal::new(1005, 3));
    }
}
