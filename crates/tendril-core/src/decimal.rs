//! Precision-safe decimal wrapper for dollar-denominated quantities.
//!
//! Uses `rust_decimal` for exact arithmetic. Ratios and fractions (allocation
//! weights, APRs) stay plain `Decimal`; `Usd` exists only to keep ledger
//! money from being mixed with those ratios by accident.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// A dollar-denominated quantity (portfolio value, gas cost, fee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usd(pub Decimal);

impl Usd {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Fraction of this amount relative to another (e.g. gas / portfolio value).
    #[inline]
    pub fn fraction_of(&self, other: Usd) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        Some(self.0 / other.0)
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Usd {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Usd {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Usd {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Usd {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Usd {
    type Output = Self;
    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Usd {
    type Output = Self;
    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fraction_of() {
        let gas = Usd::new(dec!(50));
        let portfolio = Usd::new(dec!(1000));
        assert_eq!(gas.fraction_of(portfolio).unwrap(), dec!(0.05));
    }

    #[test]
    fn test_fraction_of_zero_denominator() {
        let gas = Usd::new(dec!(50));
        assert!(gas.fraction_of(Usd::ZERO).is_none());
    }

    #[test]
    fn test_arithmetic() {
        let a = Usd::new(dec!(10));
        let b = Usd::new(dec!(3));
        assert_eq!((a + b).inner(), dec!(13));
        assert_eq!((a - b).inner(), dec!(7));
        assert_eq!((a * dec!(2)).inner(), dec!(20));
    }
}
