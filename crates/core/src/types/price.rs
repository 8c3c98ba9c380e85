//! Type-safe price representation using decimal arithmetic.
//!
//! Every amount in the store is in Toman. The backend sends prices as JSON
//! numbers; `rust_decimal` accepts both numbers and strings on the way in.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in Toman.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero Toman.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of Toman.
    #[must_use]
    pub fn toman(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The raw amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Price multiplied by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format with thousands separators using Latin digits (e.g. `1,250,000`).
    ///
    /// Fractional Toman are kept only when non-zero.
    #[must_use]
    pub fn grouped(&self) -> String {
        let normalized = self.0.normalize();
        let text = normalized.abs().to_string();
        let (whole, fraction) = text
            .split_once('.')
            .map_or((text.as_str(), None), |(w, f)| (w, Some(f)));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if normalized.is_sign_negative() && !normalized.is_zero() {
            "-"
        } else {
            ""
        };
        match fraction {
            Some(f) => format!("{sign}{grouped}.{f}"),
            None => format!("{sign}{grouped}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} تومان", self.grouped())
    }
}

/// Errors from parsing a price typed into a form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid price: {0}")]
pub struct PriceParseError(String);

impl FromStr for Price {
    type Err = PriceParseError;

    /// Parses form input, accepting Persian/Arabic digits and thousands separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = latin_digits(s.trim())
            .chars()
            .filter(|c| !matches!(c, ',' | '٬' | ' '))
            .collect();
        Decimal::from_str(&cleaned)
            .map(Self)
            .map_err(|_| PriceParseError(s.to_owned()))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Replace ASCII digits with Persian digits (`۰`-`۹`).
#[must_use]
pub fn persian_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) if c.is_ascii_digit() => char::from_u32(0x06F0 + d).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Replace Persian (`۰`-`۹`) and Arabic-Indic (`٠`-`٩`) digits with ASCII digits.
#[must_use]
pub fn latin_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '۰'..='۹' => char::from_u32(u32::from(c) - 0x06F0 + u32::from('0')).unwrap_or(c),
            '٠'..='٩' => char::from_u32(u32::from(c) - 0x0660 + u32::from('0')).unwrap_or(c),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_grouped_formatting() {
        assert_eq!(Price::toman(0).grouped(), "0");
        assert_eq!(Price::toman(950).grouped(), "950");
        assert_eq!(Price::toman(1_250_000).grouped(), "1,250,000");
        assert_eq!(Price::toman(12_000).grouped(), "12,000");
        assert_eq!(Price::new(Decimal::new(15005, 1)).grouped(), "1,500.5");
    }

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("1250000").unwrap();
        let from_string: Price = serde_json::from_str("\"1250000\"").unwrap();
        assert_eq!(from_number, Price::toman(1_250_000));
        assert_eq!(from_string, from_number);
    }

    #[test]
    fn test_parse_form_input() {
        assert_eq!("۱۲۰۰۰۰".parse::<Price>().unwrap(), Price::toman(120_000));
        assert_eq!("1,500,000".parse::<Price>().unwrap(), Price::toman(1_500_000));
        assert!("abc".parse::<Price>().is_err());
        assert!("".parse::<Price>().is_err());
    }

    #[test]
    fn test_sum_and_times() {
        let total: Price = [Price::toman(100).times(3), Price::toman(50)].into_iter().sum();
        assert_eq!(total, Price::toman(350));
        assert!(total.is_positive());
        assert!(!Price::ZERO.is_positive());
    }

    #[test]
    fn test_digit_conversion() {
        assert_eq!(persian_digits("1,250"), "۱,۲۵۰");
        assert_eq!(latin_digits("۰۹۱۲"), "0912");
        assert_eq!(latin_digits("٣٤"), "34");
    }
}
