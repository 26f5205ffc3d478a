//! Coupon code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CouponCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    /// The input string is empty.
    #[error("coupon code cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("coupon code must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// An opaque discount code.
///
/// Only the shape is checked here. Whether a code is actually redeemable is
/// decided by whoever prices the order.
///
/// ## Examples
///
/// ```
/// use doko_core::CouponCode;
///
/// let code = CouponCode::parse(" dashain10 ").unwrap();
/// assert_eq!(code.as_str(), "DASHAIN10");
/// assert!(CouponCode::parse("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    /// Maximum length of a coupon code.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `CouponCode`, trimming whitespace and upper-casing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, CouponError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CouponError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(CouponError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CouponCode {
    type Err = CouponError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes() {
        let code = CouponCode::parse("  tihar25 ").unwrap();
        assert_eq!(code.as_str(), "TIHAR25");
        assert_eq!(code, "TIHAR25".parse().unwrap());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(CouponCode::parse("   "), Err(CouponError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(CouponCode::MAX_LENGTH + 1);
        assert!(matches!(
            CouponCode::parse(&long),
            Err(CouponError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let code = CouponCode::parse("SAVE10").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"SAVE10\"");
        assert_eq!(serde_json::from_str::<CouponCode>(&json).unwrap(), code);
    }
}
