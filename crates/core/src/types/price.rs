//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are snapshots taken from the catalog when a product is added to the
//! cart, so they are plain values with no link back to the product.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The amount could not be parsed as a decimal number.
    #[error("invalid price amount: {0}")]
    Invalid(String),
    /// Two prices with different currencies were combined.
    #[error("currency mismatch: {0:?} vs {1:?}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
    /// The result does not fit in a decimal amount.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// A non-negative price with currency information.
///
/// ## Examples
///
/// ```
/// use doko_core::Price;
/// use rust_decimal::Decimal;
///
/// let price = Price::npr(Decimal::from(1749)).unwrap();
/// assert_eq!(price.to_string(), "Rs. 1,749");
/// assert_eq!(price.times(3).unwrap().amount(), Decimal::from(5247));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paisa).
    amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// Create a price in Nepalese rupees.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn npr(amount: Decimal) -> Result<Self, PriceError> {
        Self::new(amount, CurrencyCode::NPR)
    }

    /// Parse a price from user input such as `"1749"` or `"99.50"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(s.to_string()))?;
        Self::new(amount, currency_code)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of this price.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Whether the amount violates the non-negative constraint.
    ///
    /// Only reachable through deserialization, which bypasses [`Price::new`].
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Whether the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// This price multiplied by a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn times(&self, quantity: u32) -> Result<Self, PriceError> {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .ok_or(PriceError::Overflow)?;
        Ok(Self {
            amount,
            currency_code: self.currency_code,
        })
    }

    /// Add two prices of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the currencies differ and
    /// [`PriceError::Overflow`] if the sum does not fit.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code,
                other.currency_code,
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PriceError::Overflow)?;
        Ok(Self {
            amount,
            currency_code: self.currency_code,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.currency_code.symbol(),
            format_amount(self.amount)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NPR,
    INR,
    USD,
}

impl CurrencyCode {
    /// Display symbol used by the storefront.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::NPR => "Rs.",
            Self::INR => "₹",
            Self::USD => "$",
        }
    }

    /// ISO code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NPR => "NPR",
            Self::INR => "INR",
            Self::USD => "USD",
        }
    }
}

/// Format an amount with en-IN digit grouping (`12,34,567`).
///
/// At most two fraction digits are shown, and none for whole amounts.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = text
        .split_once('.')
        .map_or((text.as_str(), None), |(w, f)| (w, Some(f)));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 2);
    let digits: Vec<char> = whole.chars().collect();
    let len = digits.len();
    for (i, digit) in digits.iter().enumerate() {
        let remaining = len - i;
        if i > 0 && remaining >= 3 && (remaining == 3 || (remaining - 3) % 2 == 0) {
            grouped.push(',');
        }
        grouped.push(*digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn npr(amount: i64) -> Price {
        Price::npr(Decimal::from(amount)).unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(
            Price::npr(Decimal::from(-1)),
            Err(PriceError::Negative(_))
        ));
        assert!(Price::npr(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_parse() {
        let price = Price::parse(" 99.50 ", CurrencyCode::NPR).unwrap();
        assert_eq!(price.amount(), Decimal::new(9950, 2));
        assert!(matches!(
            Price::parse("abc", CurrencyCode::NPR),
            Err(PriceError::Invalid(_))
        ));
        assert!(matches!(
            Price::parse("-5", CurrencyCode::NPR),
            Err(PriceError::Negative(_))
        ));
    }

    #[test]
    fn test_times_and_add() {
        let line = npr(1749).times(3).unwrap();
        assert_eq!(line.amount(), Decimal::from(5247));

        let sum = line.checked_add(&npr(150)).unwrap();
        assert_eq!(sum.amount(), Decimal::from(5397));
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = Price::npr(Decimal::MAX).unwrap();
        assert_eq!(huge.times(2), Err(PriceError::Overflow));
        assert_eq!(huge.times(1).unwrap(), huge);
        assert_eq!(huge.checked_add(&npr(1)), Err(PriceError::Overflow));
    }

    #[test]
    fn test_add_currency_mismatch() {
        let usd = Price::new(Decimal::ONE, CurrencyCode::USD).unwrap();
        assert!(matches!(
            npr(1).checked_add(&usd),
            Err(PriceError::CurrencyMismatch(CurrencyCode::NPR, CurrencyCode::USD))
        ));
    }

    #[test]
    fn test_display_grouping() {
        assert_eq!(npr(0).to_string(), "Rs. 0");
        assert_eq!(npr(150).to_string(), "Rs. 150");
        assert_eq!(npr(1749).to_string(), "Rs. 1,749");
        assert_eq!(npr(245_000).to_string(), "Rs. 2,45,000");
        assert_eq!(npr(1_234_567).to_string(), "Rs. 12,34,567");
    }

    #[test]
    fn test_display_fraction() {
        let price = Price::npr(Decimal::new(174_950, 2)).unwrap();
        assert_eq!(price.to_string(), "Rs. 1,749.5");

        let price = Price::npr(Decimal::new(1_749_999, 3)).unwrap();
        assert_eq!(price.to_string(), "Rs. 1,750");
    }

    #[test]
    fn test_serde_defaults_currency() {
        let price: Price = serde_json::from_str(r#"{"amount":"1749"}"#).unwrap();
        assert_eq!(price, npr(1749));
    }
}
