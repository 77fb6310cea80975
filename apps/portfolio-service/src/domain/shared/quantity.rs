//! Quantity value object for asset balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// An asset quantity held in a portfolio.
///
/// Represented as a Decimal because balances are compared and subtracted
/// exactly; floating point would drift across long deposit/withdraw chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

/// Failure of a checked quantity operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// The amount passed to an increase/decrease was negative.
    NegativeAmount,
    /// The balance is smaller than the requested decrease.
    Insufficient,
}

impl Quantity {
    /// Zero quantity.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new Quantity from a Decimal.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Quantity from an integer.
    #[must_use]
    pub fn from_i64(amount: i64) -> Self {
        Self(Decimal::new(amount, 0))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if this quantity is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns true if this quantity is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == Decimal::ZERO
    }

    /// Returns true if this quantity is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Add `amount` to the balance.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NegativeAmount` if `amount` is negative;
    /// the balance is left unchanged.
    pub fn checked_increase(&mut self, amount: Self) -> Result<(), QuantityError> {
        if amount.is_negative() {
            return Err(QuantityError::NegativeAmount);
        }
        self.0 += amount.0;
        Ok(())
    }

    /// Subtract `amount` from the balance.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NegativeAmount` if `amount` is negative and
    /// `QuantityError::Insufficient` if the balance is smaller than
    /// `amount`; the balance is left unchanged in both cases.
    pub fn checked_decrease(&mut self, amount: Self) -> Result<(), QuantityError> {
        if amount.is_negative() {
            return Err(QuantityError::NegativeAmount);
        }
        if self.0 < amount.0 {
            return Err(QuantityError::Insufficient);
        }
        self.0 -= amount.0;
        Ok(())
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn quantity_zero_default() {
        assert!(Quantity::default().is_zero());
        assert_eq!(Quantity::default(), Quantity::ZERO);
    }

    #[test]
    fn checked_increase_adds_exactly() {
        let mut q = Quantity::new(dec!(0.1));
        q.checked_increase(Quantity::new(dec!(0.2))).unwrap();
        assert_eq!(q.amount(), dec!(0.3));
    }

    #[test]
    fn checked_increase_rejects_negative_amount() {
        let mut q = Quantity::from_i64(10);
        let err = q.checked_increase(Quantity::from_i64(-1)).unwrap_err();
        assert_eq!(err, QuantityError::NegativeAmount);
        assert_eq!(q, Quantity::from_i64(10));
    }

    #[test]
    fn checked_decrease_subtracts_exactly() {
        let mut q = Quantity::new(dec!(10));
        q.checked_decrease(Quantity::new(dec!(3))).unwrap();
        assert_eq!(q.amount(), dec!(7));
    }

    #[test]
    fn checked_decrease_fails_when_insufficient() {
        let mut q = Quantity::new(dec!(7));
        let err = q.checked_decrease(Quantity::new(dec!(10))).unwrap_err();
        assert_eq!(err, QuantityError::Insufficient);
        assert_eq!(q.amount(), dec!(7));
    }

    #[test]
    fn checked_decrease_allows_full_balance() {
        let mut q = Quantity::new(dec!(5));
        q.checked_decrease(Quantity::new(dec!(5))).unwrap();
        assert!(q.is_zero());
    }

    #[test]
    fn comparison_is_exact_decimal_ordering() {
        assert!(Quantity::new(dec!(0.3)) > Quantity::new(dec!(0.29999)));
        assert!(Quantity::new(dec!(1.0)) == Quantity::new(dec!(1)));
    }

    #[test]
    fn quantity_serde_roundtrip() {
        let q = Quantity::new(dec!(12.3456));
        let json = serde_json::to_string(&q).unwrap();
        let parsed: Quantity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, q);
    }

    proptest! {
        // Deposit a then withdraw b (b <= a) lands on exactly a - b,
        // across 1000 random pairs with fractional digits.
        #![proptest_config(ProptestConfig::with_cases(1000))]
        #[test]
        fn deposit_then_withdraw_is_exact(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
            let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
            let deposit = Quantity::new(Decimal::new(hi, 4));
            let withdraw = Quantity::new(Decimal::new(lo, 4));

            let mut balance = Quantity::ZERO;
            balance.checked_increase(deposit).unwrap();
            balance.checked_decrease(withdraw).unwrap();

            prop_assert_eq!(balance.amount(), Decimal::new(hi - lo, 4));
            prop_assert!(!balance.is_negative());
        }
    }
}
