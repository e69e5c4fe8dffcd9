/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantileParseError {
    #[error("invalid decimal string: {0}")]
    InvalidDecimal(String),
    #[error("quantile {0} is out of range [0, 1]")]
    OutOfRange(Decimal),
}

/// A fraction in `[0, 1]` kept as an exact decimal.
///
/// The decimal form is used for ordering and display, the float form for
/// histogram lookups.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantile {
    value: Decimal,
    name: Cow<'static, str>,
}

macro_rules! const_quantile {
    ($id:ident, $mantissa:expr, $scale:expr, $name:literal) => {
        pub const $id: Quantile = Quantile {
            value: Decimal::from_parts($mantissa, 0, 0, false, $scale),
            name: Cow::Borrowed($name),
        };
    };
}

impl Quantile {
    const_quantile!(PCT25, 25, 2, "0.25");
    const_quantile!(PCT50, 5, 1, "0.5");
    const_quantile!(PCT75, 75, 2, "0.75");
    const_quantile!(PCT80, 8, 1, "0.8");
    const_quantile!(PCT90, 9, 1, "0.9");
    const_quantile!(PCT95, 95, 2, "0.95");
    const_quantile!(PCT99, 99, 2, "0.99");
    const_quantile!(PCT999, 999, 3, "0.999");
    const_quantile!(PCT9999, 9999, 4, "0.9999");

    #[inline]
    pub fn decimal(&self) -> Decimal {
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value.to_f64().unwrap_or_default()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl TryFrom<Decimal> for Quantile {
    type Error = QuantileParseError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        if value.is_sign_negative() || value > Decimal::ONE {
            return Err(QuantileParseError::OutOfRange(value));
        }
        let value = value.normalize();
        Ok(Quantile {
            value,
            name: Cow::Owned(value.to_string()),
        })
    }
}

impl FromStr for Quantile {
    type Err = QuantileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| QuantileParseError::InvalidDecimal(s.to_string()))?;
        Quantile::try_from(value)
    }
}

impl fmt::Display for Quantile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() {
        let q = Quantile::from_str("0.99").unwrap();
        assert_eq!(q, Quantile::PCT99);
        assert_eq!(q.as_str(), "0.99");
        assert_eq!(q.value(), 0.99);

        let q = Quantile::from_str(" 0.500 ").unwrap();
        assert_eq!(q, Quantile::PCT50);

        assert_eq!(Quantile::from_str("1").unwrap().value(), 1.0);
        assert_eq!(Quantile::from_str("0").unwrap().value(), 0.0);
    }

    #[test]
    fn parse_error() {
        assert!(matches!(
            Quantile::from_str("abc"),
            Err(QuantileParseError::InvalidDecimal(_))
        ));
        assert!(matches!(
            Quantile::from_str("1.5"),
            Err(QuantileParseError::OutOfRange(_))
        ));
        assert!(matches!(
            Quantile::from_str("-0.1"),
            Err(QuantileParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn ordering() {
        assert!(Quantile::PCT25 < Quantile::PCT50);
        assert!(Quantile::PCT999 < Quantile::PCT9999);
        assert_eq!(Quantile::PCT9999.to_string(), "0.9999");
    }
}
