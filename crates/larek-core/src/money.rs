//! # Money Module
//!
//! Provides the `Money` type for catalog prices and order totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The catalog prices everything in whole "synapses":                     │
//! │                                                                         │
//! │    { "price": 750 }     →  Money::from_units(750)                       │
//! │    { "price": null }    →  None  (not for sale, "priceless")            │
//! │                                                                         │
//! │    { "price": 12.5 }    →  Money::from_units(13)  (rounded on read)     │
//! │                                                                         │
//! │  Totals are whole units, so an i64 newtype is exact and the JSON shape  │
//! │  stays a plain number. Arithmetic saturates instead of overflowing.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use larek_core::money::Money;
//!
//! let price = Money::from_units(750);
//! let total: Money = [price, Money::from_units(250)].into_iter().sum();
//! assert_eq!(total.units(), 1000);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units.
///
/// Serialized transparently as a JSON number, matching the `price` and
/// `total` fields of the REST API. Fractional numbers are accepted on read
/// and rounded half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero money.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Sums optional prices, counting `None` (not for sale) as zero.
    ///
    /// ## Policy
    /// A product with an unknown price contributes nothing to a total.
    /// Callers that must reject priceless items check before summing.
    pub fn sum_priced<'a, I>(prices: I) -> Money
    where
        I: IntoIterator<Item = &'a Option<Money>>,
    {
        prices.into_iter().flatten().copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Deserialization
// =============================================================================

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number of currency units")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
        Ok(Money(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
        i64::try_from(v)
            .map(Money)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
        let rounded = v.round();
        // i64::MAX is not representable as f64; 2^63 is the first value out of range
        if !rounded.is_finite() || rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
            return Err(E::invalid_value(de::Unexpected::Float(v), &self));
        }
        Ok(Money(rounded as i64))
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let m = Money::from_units(750);
        assert_eq!(m.units(), 750);
        assert!(!m.is_zero());
        assert!(Money::default().is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(100);
        let b = Money::from_units(50);
        assert_eq!((a + b).units(), 150);
        assert_eq!((a - b).units(), 50);

        let mut c = a;
        c += b;
        assert_eq!(c.units(), 150);
    }

    #[test]
    fn test_sum_priced_skips_priceless() {
        let prices = vec![
            Some(Money::from_units(100)),
            None,
            Some(Money::from_units(50)),
        ];
        assert_eq!(Money::sum_priced(&prices).units(), 150);
        assert!(Money::sum_priced(&Vec::<Option<Money>>::new()).is_zero());
    }

    #[test]
    fn test_json_is_plain_number() {
        let json = serde_json::to_string(&Money::from_units(2500)).unwrap();
        assert_eq!(json, "2500");

        let back: Money = serde_json::from_str("1450").unwrap();
        assert_eq!(back.units(), 1450);
    }

    #[test]
    fn test_fractional_json_is_rounded() {
        let cases = [("12.5", 13), ("12.4", 12), ("-0.5", -1), ("750.0", 750)];
        for (json, units) in cases {
            let money: Money = serde_json::from_str(json).unwrap();
            assert_eq!(money.units(), units, "{json}");
        }

        assert!(serde_json::from_str::<Money>("1e300").is_err());
        assert!(serde_json::from_str::<Money>("18446744073709551615").is_err());
        assert!(serde_json::from_str::<Money>("\"750\"").is_err());
    }

    #[test]
    fn test_optional_price_accepts_null_and_fraction() {
        let prices: Vec<Option<Money>> = serde_json::from_str("[null, 99.9, 10]").unwrap();
        assert_eq!(prices, vec![None, Some(Money::from_units(100)), Some(Money::from_units(10))]);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_units(i64::MAX);
        assert_eq!((huge + Money::from_units(1)).units(), i64::MAX);
        assert_eq!((Money::from_units(i64::MIN) - Money::from_units(1)).units(), i64::MIN);

        let prices = vec![Some(huge), None, Some(huge)];
        assert_eq!(Money::sum_priced(&prices).units(), i64::MAX);
    }
}
