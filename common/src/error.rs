//! Error types shared across fxnorm crates.

use thiserror::Error;

/// Errors raised while validating currency codes at the API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code was empty after trimming.
    #[error("Currency code is empty")]
    Empty,

    /// The code was not exactly three characters long.
    #[error("Currency code '{0}' must be exactly 3 letters")]
    InvalidLength(String),

    /// The code contained something other than ASCII letters.
    #[error("Currency code '{0}' must contain only ASCII letters")]
    InvalidCharacters(String),
}

impl CurrencyError {
    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrencyError::Empty => "CURRENCY_EMPTY",
            CurrencyError::InvalidLength(_) => "CURRENCY_INVALID_LENGTH",
            CurrencyError::InvalidCharacters(_) => "CURRENCY_INVALID_CHARACTERS",
        }
    }
}

/// Result type alias for validation in this crate.
pub type Result<T> = std::result::Result<T, CurrencyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    #[test]
    fn test_error_codes_follow_parse_failures() {
        let codes: Vec<&str> = ["", "EURO", "U$D"]
            .iter()
            .map(|code| Currency::parse(code).unwrap_err().error_code())
            .collect();

        assert_eq!(
            codes,
            vec!["CURRENCY_EMPTY", "CURRENCY_INVALID_LENGTH", "CURRENCY_INVALID_CHARACTERS"]
        );
    }
}
