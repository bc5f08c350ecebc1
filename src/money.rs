//! Money Module
//!
//! Unified handling of monetary values. All amounts and balances are
//! `rust_decimal::Decimal` at currency scale (2 decimal places). Every
//! arithmetic result is passed through [`round2`] immediately, never only at
//! output, so floating drift cannot accumulate.
//!
//! ## Design Principles
//! 1. Single rounding rule: round-half-up at the cent
//! 2. Explicit Error Handling: no silent truncation of client input
//! 3. JSON transport as plain numbers rounded to 2 places
//!
//! ## Usage
//! ```rust
//! use ledger_bank::money::{parse_amount, round2, format_amount};
//! use rust_decimal::Decimal;
//!
//! let amount = parse_amount("1.50").unwrap();
//! assert_eq!(format_amount(amount), "1.50");
//! assert_eq!(round2(Decimal::new(1005, 3)), Decimal::new(101, 2));
//! ```

use rust_decimal::prelude::*;
use thiserror::Error;

/// Decimal places of the single supported currency (paise/cents)
pub const CURRENCY_SCALE: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

// ============================================================================
// Rounding
// ============================================================================

/// Round to currency scale using round-half-up at the cent.
///
/// Monetary values handled here are non-negative, so "away from zero" is
/// exactly half-up.
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

// ============================================================================
// Parse / Validate: Client → Internal
// ============================================================================

/// Validate an already-parsed amount.
///
/// Rejects zero, negative values and anything finer than a cent.
pub fn validate_amount(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(MoneyError::InvalidAmount);
    }

    let normalized = amount.normalize();
    if normalized.scale() > CURRENCY_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: CURRENCY_SCALE,
        });
    }

    Ok(round2(normalized))
}

/// Parse a client string amount ("250", "99.5", "1000.00").
///
/// Formats like `.5`, `5.`, `+5`, `1e3` and `1,000` are rejected.
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let s = amount_str.trim();
    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if s.starts_with('-') {
        return Err(MoneyError::InvalidAmount);
    }
    if s.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
    }

    let mut parts = s.split('.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next();
    if parts.next().is_some() {
        return Err(MoneyError::InvalidFormat("multiple decimal points".into()));
    }

    if whole.is_empty() {
        return Err(MoneyError::InvalidFormat(
            "missing leading zero (e.g., use 0.5 instead of .5)".into(),
        ));
    }
    if frac.is_some_and(str::is_empty) {
        return Err(MoneyError::InvalidFormat(
            "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
        ));
    }

    let all_digits = whole.bytes().all(|b| b.is_ascii_digit())
        && frac.is_none_or(|f| f.bytes().all(|b| b.is_ascii_digit()));
    if !all_digits {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in amount: {}",
            s
        )));
    }

    let decimal = Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(e.to_string()))?;
    validate_amount(decimal)
}

// ============================================================================
// Format: Internal → Client
// ============================================================================

/// Format with exactly two decimal places ("1010.00")
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round2(value))
}

/// Serde helpers: serialize a Decimal as a JSON number rounded to 2 places.
pub mod amount_serde {
    use super::round2;
    use rust_decimal::Decimal;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&round2(*value), serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(round2)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
