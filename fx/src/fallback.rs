//! Static last-resort rates.

use fxnorm_common::Currency;
use std::collections::HashMap;

/// Approximate rates for a few major pairs, used only when no live rate can
/// be obtained. Built once; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FallbackRateTable {
    rates: HashMap<Currency, HashMap<Currency, f64>>,
}

const BUILTIN: &[(&str, &[(&str, f64)])] = &[
    (
        "USD",
        &[
            ("EUR", 0.85),
            ("GBP", 0.73),
            ("JPY", 110.0),
            ("CAD", 1.25),
            ("AUD", 1.35),
            ("CHF", 0.92),
            ("CNY", 6.45),
            ("INR", 74.5),
        ],
    ),
    (
        "EUR",
        &[
            ("USD", 1.18),
            ("GBP", 0.86),
            ("JPY", 129.0),
            ("CAD", 1.47),
            ("AUD", 1.59),
            ("CHF", 1.08),
            ("CNY", 7.59),
            ("INR", 87.7),
        ],
    ),
    (
        "GBP",
        &[
            ("USD", 1.37),
            ("EUR", 1.16),
            ("JPY", 150.0),
            ("CAD", 1.71),
            ("AUD", 1.85),
            ("CHF", 1.26),
            ("CNY", 8.84),
            ("INR", 102.1),
        ],
    ),
];

impl FallbackRateTable {
    /// The built-in table of USD, EUR and GBP rows.
    pub fn builtin() -> Self {
        BUILTIN
            .iter()
            .flat_map(|(from, row)| {
                row.iter()
                    .map(move |(to, rate)| (Currency::new(*from), Currency::new(*to), *rate))
            })
            .collect()
    }

    /// A table with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add or replace one directed rate while building a table.
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: f64) -> Self {
        self.rates.entry(from).or_default().insert(to, rate);
        self
    }

    /// Approximate rate for `from -> to`. Only direct entries are consulted.
    pub fn lookup(&self, from: &Currency, to: &Currency) -> Option<f64> {
        self.rates.get(from)?.get(to).copied()
    }

    /// Number of directed pairs.
    pub fn len(&self) -> usize {
        self.rates.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(Currency, Currency, f64)> for FallbackRateTable {
    fn from_iter<I: IntoIterator<Item = (Currency, Currency, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::empty(), |table, (from, to, rate)| {
                table.with_rate(from, to, rate)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let table = FallbackRateTable::builtin();

        assert_eq!(table.lookup(&Currency::usd(), &Currency::eur()), Some(0.85));
        assert_eq!(table.lookup(&Currency::gbp(), &Currency::jpy()), Some(150.0));
        assert_eq!(table.len(), 24);
    }

    #[test]
    fn test_no_inverse_derivation() {
        let table = FallbackRateTable::builtin();

        assert_eq!(table.lookup(&Currency::jpy(), &Currency::usd()), None);
        assert_eq!(table.lookup(&Currency::new("SEK"), &Currency::new("NOK")), None);
    }

    #[test]
    fn test_custom_table() {
        let table = FallbackRateTable::empty().with_rate(Currency::usd(), Currency::eur(), 0.5);

        assert_eq!(table.lookup(&Currency::usd(), &Currency::eur()), Some(0.5));
        assert!(FallbackRateTable::empty().is_empty());
    }
}
