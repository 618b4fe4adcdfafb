//! Time utilities and constants for fxnorm.

use chrono::{DateTime, Duration, Utc};

/// Timing defaults.
pub mod constants {
    use super::Duration;

    /// How long a fetched rate table is trusted (5 minutes).
    pub fn rate_staleness_window() -> Duration {
        Duration::minutes(5)
    }

    /// Per-request timeout for rate endpoints (5 seconds).
    pub fn rate_request_timeout() -> Duration {
        Duration::seconds(5)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Whether `timestamp` is still within `window` of `at`.
///
/// The boundary is exclusive: an entry exactly `window` old is stale.
pub fn is_within(timestamp: Timestamp, window: Duration, at: Timestamp) -> bool {
    at.signed_duration_since(timestamp) < window
}

/// Conversion into `std::time::Duration` for timer and client APIs.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
