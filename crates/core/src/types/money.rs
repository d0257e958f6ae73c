//! Exact monetary amounts using decimal arithmetic.
//!
//! Cart totals are accumulated without rounding; [`Money::display`] rounds to
//! cents once, at presentation time.
//!
//! The `+`, `*` and `Sum` operators saturate at the decimal range instead of
//! panicking. Code that must reject out-of-range amounts uses
//! [`Money::checked_add`] and [`Money::checked_mul`].

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes the storefront can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    CNY,
}

impl CurrencyCode {
    /// Symbol prefixed to formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CNY => "¥",
        }
    }
}

/// A monetary amount in the store currency.
///
/// Serializes as the bare decimal so it matches the backend's `price` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build an amount from a count of cents, e.g. `1999` for 19.99.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The unrounded amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round half-away-from-zero to whole cents.
    #[must_use]
    pub fn round_to_cents(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// `self + rhs`, or `None` if the sum is out of range.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// `self × quantity`, or `None` if the product is out of range.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Format for display with the currency symbol (e.g. `¥39.99`).
    #[must_use]
    pub fn display(&self, currency: CurrencyCode) -> String {
        format!("{}{}", currency.symbol(), self.round_to_cents())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_cents().0;
        write!(f, "{rounded:.2}")
    }
}

impl core::str::FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Decimal>().map(Self)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_is_exact() {
        let total: Money = [Money::from_cents(1999), Money::from_cents(500) * 4]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(3999));
    }

    #[test]
    fn test_display_rounds_once() {
        let third = Money::new(Decimal::new(10, 0) / Decimal::new(3, 0));
        assert_eq!((third * 3).to_string(), "10.00");
        assert_eq!(Money::from_cents(500).display(CurrencyCode::CNY), "¥5.00");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_overflow_saturates_instead_of_panicking() {
        let huge = Money::new(Decimal::MAX);

        assert_eq!(huge.checked_mul(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(huge * 2, huge);
        assert_eq!(huge + huge, huge);

        let total: Money = [huge, huge, Money::from_cents(100)].into_iter().sum();
        assert_eq!(total, huge);
        assert_eq!(Money::from_cents(250).checked_mul(3), Some(Money::from_cents(750)));
    }

    #[test]
    fn test_negative_detection() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::ZERO.is_negative());
    }

    #[test]
    fn test_deserializes_numbers_and_strings() {
        let from_number: Money = serde_json::from_str("19.99").unwrap();
        let from_string: Money = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(from_number, Money::from_cents(1999));
        assert_eq!(from_string, Money::from_cents(1999));
    }
}
