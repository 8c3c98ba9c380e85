//! Mobile phone number type.
//!
//! Phones are the login identity: OTP codes are sent to them and the admin
//! bootstrap account is matched by phone.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::latin_digits;

/// Prefix some backend accounts carry in front of the phone number.
pub const ACCOUNT_PREFIX: &str = "shop_2";

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("شماره موبایل را وارد کنید")]
    Empty,
    /// The input contains something other than digits.
    #[error("شماره موبایل فقط می‌تواند شامل اعداد باشد")]
    InvalidCharacters,
    /// The input is too long to be a phone number.
    #[error("شماره موبایل حداکثر {max} رقم است")]
    TooLong {
        /// Maximum allowed digits.
        max: usize,
    },
}

/// A mobile phone number.
///
/// ## Constraints
///
/// - Persian and Arabic-Indic digits are normalized to ASCII
/// - Spaces and dashes are ignored
/// - A leading `+` is kept, every other character must be a digit
/// - At most 15 digits (E.164)
///
/// ## Examples
///
/// ```
/// use luxe_core::Phone;
///
/// assert_eq!(Phone::parse("۰۹۱۲ ۳۴۵ ۶۷۸۹").unwrap().as_str(), "09123456789");
/// assert!(Phone::parse("").is_err());
/// assert!(Phone::parse("0912abc").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Maximum number of digits (E.164).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit characters,
    /// or has more than 15 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let normalized: String = latin_digits(s.trim())
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect();

        if normalized.is_empty() {
            return Err(PhoneError::Empty);
        }

        let digits = normalized.strip_prefix('+').unwrap_or(&normalized);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::InvalidCharacters);
        }
        if digits.len() > Self::MAX_DIGITS {
            return Err(PhoneError::TooLong {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Strip the backend's account prefix from a login phone.
///
/// ```
/// use luxe_core::types::phone::strip_account_prefix;
///
/// assert_eq!(strip_account_prefix("shop_209121234567"), "09121234567");
/// assert_eq!(strip_account_prefix("09121234567"), "09121234567");
/// ```
#[must_use]
pub fn strip_account_prefix(phone: &str) -> &str {
    phone.strip_prefix(ACCOUNT_PREFIX).unwrap_or(phone)
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phones() {
        assert_eq!(Phone::parse("09121234567").unwrap().as_str(), "09121234567");
        assert_eq!(Phone::parse(" +98 912-123-4567 ").unwrap().as_str(), "+989121234567");
        assert_eq!(Phone::parse("٠٩١٢١٢٣٤٥٦٧").unwrap().as_str(), "09121234567");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert_eq!(Phone::parse("0912x"), Err(PhoneError::InvalidCharacters));
        assert_eq!(Phone::parse("+"), Err(PhoneError::InvalidCharacters));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Phone::parse("0912123456789012"),
            Err(PhoneError::TooLong { max: 15 })
        ));
    }

    #[test]
    fn test_strip_account_prefix_only_at_start() {
        assert_eq!(strip_account_prefix("shop_2shop_2"), "shop_2");
        assert_eq!(strip_account_prefix("0912shop_2"), "0912shop_2");
    }
}
