//! FX engine error types.

use fxnorm_common::{Currency, CurrencyError};
use thiserror::Error;

/// Errors that can occur in the FX engine.
///
/// None of these reach callers of the conversion API for ordinary remote
/// unavailability; the engine absorbs them and degrades instead.
#[derive(Debug, Error)]
pub enum FxError {
    /// A single endpoint failed (bad status, timeout, transport error or
    /// unparsable body). Recovered by moving to the next endpoint.
    #[error("Endpoint {endpoint} failed: {reason}")]
    Endpoint { endpoint: String, reason: String },

    /// Every configured endpoint failed for the base currency.
    #[error("All rate endpoints failed for {base} (tried: {})", .attempted.join(", "))]
    AllEndpointsFailed {
        base: Currency,
        attempted: Vec<String>,
    },

    /// The rate table for `from` has no entry for `to`.
    #[error("No rate available for {from} -> {to}")]
    MissingRate { from: Currency, to: Currency },

    /// Malformed caller input, such as a bad currency code.
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] CurrencyError),

    /// Configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FxError {
    /// Get error code for diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Endpoint { .. } => "ENDPOINT_FAILURE",
            FxError::AllEndpointsFailed { .. } => "ALL_ENDPOINTS_FAILED",
            FxError::MissingRate { .. } => "MISSING_RATE",
            FxError::InvalidArgument(_) => "INVALID_ARGUMENT",
            FxError::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }

    /// Whether a later attempt could succeed without changing the request.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FxError::Endpoint { .. } | FxError::AllEndpointsFailed { .. }
        )
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
