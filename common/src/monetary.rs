//! Monetary types for fxnorm.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CurrencyError;

/// ISO 4217 currency code.
///
/// Always stored upper-case. Use [`Currency::parse`] for untrusted input;
/// [`Currency::new`] only normalizes case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a currency from a known-good code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Parse and validate a currency code: exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return Err(CurrencyError::Empty);
        }
        if trimmed.chars().count() != 3 {
            return Err(CurrencyError::InvalidLength(trimmed.to_string()));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCharacters(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of minor units (decimal places) used when displaying amounts.
    pub fn minor_units(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.0
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Currencies whose rate tables are worth warming at startup.
pub const COMMON_CURRENCIES: [&str; 6] = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD"];

/// Render an amount for display, rounded to the currency's minor units.
///
/// Conversion results are raw floating point; this is the only place
/// rounding happens.
pub fn format_amount(amount: f64, currency: &Currency) -> String {
    let places = currency.minor_units() as usize;
    format!("{:.*} {}", places, amount, currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        let c = Currency::parse(" eur ").unwrap();
        assert_eq!(c.code(), "EUR");
        assert_eq!(c, Currency::eur());
    }

    #[test]
    fn test_parse_rejects_malformed_codes() {
        assert_eq!(Currency::parse(""), Err(CurrencyError::Empty));
        assert!(matches!(
            Currency::parse("EURO"),
            Err(CurrencyError::InvalidLength(_))
        ));
        assert!(matches!(
            Currency::parse("U$D"),
            Err(CurrencyError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn test_currency_serde_validates() {
        let c: Currency = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(c, Currency::gbp());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"GBP\"");
        assert!(serde_json::from_str::<Currency>("\"pounds\"").is_err());
    }

    #[test]
    fn test_currency_minor_units() {
        assert_eq!(Currency::usd().minor_units(), 2);
        assert_eq!(Currency::jpy().minor_units(), 0);
        assert_eq!(Currency::new("KWD").minor_units(), 3);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(27.5, &Currency::usd()), "27.50 USD");
        assert_eq!(format_amount(15123.6, &Currency::jpy()), "15124 JPY");
        assert_eq!(format_amount(1.23456, &Currency::new("BHD")), "1.235 BHD");
    }
}
