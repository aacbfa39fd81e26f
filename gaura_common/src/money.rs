use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub},
    str::FromStr,
};

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::op;

/// The storefront only sells in US dollars.
pub const STORE_CURRENCY_CODE: &str = "usd";

//--------------------------------------       Money         ---------------------------------------------------------
/// An exact decimal amount of store currency.
///
/// The REST backend exchanges prices as JSON numbers, so `Money` serializes as a float on the wire but all arithmetic
/// is performed on the underlying [`Decimal`], so that `10.00 × 3` is exactly `30.00`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a store price: {0}")]
pub struct MoneyConversionError(String);

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<u32> for Money {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        Decimal::from_str(s).map(Self).map_err(|e| MoneyConversionError(format!("{s}. {e}")))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_sign_negative() {
            write!(f, "-${:.2}", self.0.abs())
        } else {
            write!(f, "${:.2}", self.0)
        }
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Converts a whole number of cents into `Money`, e.g. the `amount_total` reported by the payment provider.
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// The amount in whole cents, rounded half away from zero. `None` if it does not fit in an `i64`.
    pub fn to_cents(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero).to_i64()
    }
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn arithmetic_is_exact() {
        let price = Money::from(dec!(13.99));
        assert_eq!(price * 3, Money::from(dec!(41.97)));
        let total: Money = vec![Money::from(dec!(0.10)), Money::from(dec!(0.20))].into_iter().sum();
        assert_eq!(total, Money::from(dec!(0.30)));
        assert_eq!(Money::from_cents(2000), Money::from(dec!(20)));
        assert_eq!(Money::from(dec!(34.505)).to_cents(), Some(3451));
    }

    #[test]
    fn cents_round_half_away_from_zero() {
        assert_eq!(Money::from(dec!(0.125)).to_cents(), Some(13));
        assert_eq!(Money::from(dec!(0.135)).to_cents(), Some(14));
        assert_eq!(Money::from(dec!(-0.125)).to_cents(), Some(-13));
        assert_eq!(Money::from(dec!(0.124)).to_cents(), Some(12));
        assert_eq!(Money::from_cents(2000).to_cents(), Some(2000));
    }

    #[test]
    fn display() {
        assert_eq!(Money::from(dec!(20)).to_string(), "$20.00");
        assert_eq!(Money::from(dec!(-1.5)).to_string(), "-$1.50");
        assert_eq!("$7.25".parse::<Money>().unwrap(), Money::from(dec!(7.25)));
        assert!("seven".parse::<Money>().is_err());
    }

    #[test]
    fn wire_format_is_a_json_number() {
        let json = serde_json::to_string(&Money::from(dec!(10.5))).unwrap();
        assert_eq!(json, "10.5");
        let m: Money = serde_json::from_str("20").unwrap();
        assert_eq!(m, Money::from(dec!(20.00)));
    }
}
