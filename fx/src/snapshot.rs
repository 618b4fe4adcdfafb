//! Immutable rate tables.

use chrono::{DateTime, Duration, Utc};
use fxnorm_common::{is_within, Currency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::error::{FxError, FxResult};

/// A full rate table for one base currency at one point in time.
///
/// `rates[base] == 1.0` always holds, whatever the source reported.
/// Snapshots are never mutated; a newer fetch replaces the whole thing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    base: Currency,
    rates: BTreeMap<Currency, f64>,
    fetched_at: DateTime<Utc>,
    source: String,
}

impl RateSnapshot {
    /// Build a snapshot fetched now.
    pub fn new(
        base: Currency,
        rates: impl IntoIterator<Item = (Currency, f64)>,
        source: impl Into<String>,
    ) -> Self {
        Self::with_fetch_time(base, rates, source, Utc::now())
    }

    /// Build a snapshot with an explicit fetch time.
    ///
    /// Zero, negative and non-finite rates are dropped.
    pub fn with_fetch_time(
        base: Currency,
        rates: impl IntoIterator<Item = (Currency, f64)>,
        source: impl Into<String>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut rates: BTreeMap<Currency, f64> = rates
            .into_iter()
            .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
            .collect();
        rates.insert(base.clone(), 1.0);

        Self {
            base,
            rates,
            fetched_at,
            source: source.into(),
        }
    }

    /// Build a snapshot from raw provider output keyed by currency code.
    ///
    /// Entries whose key is not a valid code or whose value is not a
    /// positive number are skipped.
    pub fn from_raw(
        base: Currency,
        raw: impl IntoIterator<Item = (String, serde_json::Value)>,
        source: impl Into<String>,
    ) -> Self {
        let source = source.into();
        let mut skipped = 0usize;
        let rates: Vec<(Currency, f64)> = raw
            .into_iter()
            .filter_map(|(code, value)| match Currency::parse(&code) {
                Ok(quote) => {
                    let rate = value.as_f64();
                    if rate.is_none() {
                        skipped += 1;
                    }
                    rate.map(|rate| (quote, rate))
                }
                Err(e) => {
                    skipped += 1;
                    trace!(code = %code, reason = e.error_code(), "Rejected rate key");
                    None
                }
            })
            .collect();

        if skipped > 0 {
            debug!(base = %base, source = %source, skipped, "Skipped unusable rate entries");
        }
        Self::new(base, rates, source)
    }

    /// The base currency.
    pub fn base(&self) -> &Currency {
        &self.base
    }

    /// All rates, relative to the base.
    pub fn rates(&self) -> &BTreeMap<Currency, f64> {
        &self.rates
    }

    /// Rate from the base into `quote`.
    pub fn rate(&self, quote: &Currency) -> Option<f64> {
        self.rates.get(quote).copied()
    }

    /// Rate into `quote`, or [`FxError::MissingRate`].
    pub fn require(&self, quote: &Currency) -> FxResult<f64> {
        self.rate(quote).ok_or_else(|| FxError::MissingRate {
            from: self.base.clone(),
            to: quote.clone(),
        })
    }

    /// Number of quoted currencies, the base included.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table quotes anything besides the base itself.
    pub fn has_foreign_rates(&self) -> bool {
        self.rates.len() > 1
    }

    /// When the table was fetched.
    pub fn fetched_at_time(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Fetch time as milliseconds since the Unix epoch.
    pub fn fetched_at_epoch_millis(&self) -> i64 {
        self.fetched_at.timestamp_millis()
    }

    /// Where the table came from (endpoint name).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the snapshot is younger than `window` at `at`.
    pub fn is_fresh(&self, window: Duration, at: DateTime<Utc>) -> bool {
        is_within(self.fetched_at, window, at)
    }
}
