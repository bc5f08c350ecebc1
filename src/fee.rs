//! Fee calculation
//!
//! Internal transfers are free. External transfers pay
//! `max(minimum, amount × rate)` rounded half-up to the cent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round2;

/// Default external transfer rate (0.005 = 0.5%)
pub const DEFAULT_EXTERNAL_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Default external transfer floor (10.00 currency units)
pub const DEFAULT_EXTERNAL_MINIMUM: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);

/// Processing fee policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Proportional rate for external transfers
    pub external_rate: Decimal,
    /// Floor for external transfers
    pub external_minimum: Decimal,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            external_rate: DEFAULT_EXTERNAL_RATE,
            external_minimum: DEFAULT_EXTERNAL_MINIMUM,
        }
    }
}

/// Amount, fee and total debit for one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub amount: Decimal,
    pub fee: Decimal,
    pub total_debit: Decimal,
}

impl FeePolicy {
    /// Calculate the processing fee for a transfer.
    #[inline]
    pub fn compute_fee(&self, amount: Decimal, is_internal: bool) -> Decimal {
        if is_internal {
            return Decimal::ZERO;
        }
        let proportional = round2(amount * self.external_rate);
        round2(proportional.max(self.external_minimum))
    }

    /// Fee plus `total_debit = round2(amount + fee)`.
    pub fn quote(&self, amount: Decimal, is_internal: bool) -> FeeQuote {
        let amount = round2(amount);
        let fee = self.compute_fee(amount, is_internal);
        FeeQuote {
            amount,
            fee,
            total_debit: round2(amount + fee),
        }
    }
}

/// Calculate fee with the default policy.
///
/// # Example
/// ```
/// use ledger_bank::fee::compute_fee;
/// use rust_decimal::Decimal;
///
/// // 1000.00 * 0.5% = 5.00, below the 10.00 floor
/// assert_eq!(compute_fee(Decimal::new(100000, 2), false), Decimal::new(1000, 2));
/// assert_eq!(compute_fee(Decimal::new(100000, 2), true), Decimal::ZERO);
/// ```
#[inline]
pub fn compute_fee(amount: Decimal, is_internal: bool) -> Decimal {
    FeePolicy::default().compute_fee(amount, is_internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_internal_is_free() {
        for amount in ["0.01", "200", "999999.99"] {
            assert_eq!(compute_fee(d(amount), true), Decimal::ZERO);
        }
    }

    #[test]
    fn test_external_minimum_applies() {
        // 1000 * 0.005 = 5.00 -> floor 10.00
        assert_eq!(compute_fee(d("1000"), false), d("10.00"));
        assert_eq!(compute_fee(d("0.01"), false), d("10.00"));
        // 2000 * 0.005 = 10.00 exactly
        assert_eq!(compute_fee(d("2000"), false), d("10.00"));
    }

    #[test]
    fn test_external_proportional() {
        assert_eq!(compute_fee(d("5000"), false), d("25.00"));
        // 2001.50 * 0.005 = 10.0075 -> 10.01
        assert_eq!(compute_fee(d("2001.50"), false), d("10.01"));
        // 2100.10 * 0.005 = 10.5005 -> 10.50
        assert_eq!(compute_fee(d("2100.10"), false), d("10.50"));
    }

    #[test]
    fn test_fee_matches_closed_form() {
        let ten = d("10");
        for amount in ["1", "1999.99", "2000.01", "3333.33", "12345.67", "1000000"] {
            let amount = d(amount);
            let expected = ten.max(round2(amount * d("0.005")));
            assert_eq!(compute_fee(amount, false), expected, "amount {}", amount);
        }
    }

    #[test]
    fn test_quote_total_debit() {
        let quote = FeePolicy::default().quote(d("1000"), false);
        assert_eq!(quote.fee, d("10.00"));
        assert_eq!(quote.total_debit, d("1010.00"));

        let quote = FeePolicy::default().quote(d("200"), true);
        assert_eq!(quote.fee, Decimal::ZERO);
        assert_eq!(quote.total_debit, d("200"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = FeePolicy {
            external_rate: d("0.01"),
            external_minimum: d("2.50"),
        };
        assert_eq!(policy.compute_fee(d("100"), false), d("2.50"));
        assert_eq!(policy.compute_fee(d("1000"), false), d("10.00"));
    }
}
