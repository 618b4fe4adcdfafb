//! Main conversion engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use fxnorm_common::{Currency, LineItem};
use tracing::{debug, instrument, warn};

use crate::cache::{CacheStats, RateCache};
use crate::conversion::{Conversion, ConversionResult, ConvertedLineItem, RateOrigin};
use crate::error::FxResult;
use crate::fallback::FallbackRateTable;
use crate::snapshot::RateSnapshot;

#[derive(Debug, Default)]
struct EngineCounters {
    same_currency: AtomicU64,
    live: AtomicU64,
    fallback: AtomicU64,
    identity: AtomicU64,
}

impl EngineCounters {
    fn record(&self, origin: RateOrigin) {
        let counter = match origin {
            RateOrigin::SameCurrency => &self.same_currency,
            RateOrigin::Live => &self.live,
            RateOrigin::Fallback => &self.fallback,
            RateOrigin::Identity => &self.identity,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Converts amounts and carts between currencies.
///
/// Preference order for a rate is: live (via the cache), static fallback,
/// then identity. Conversion never fails; degraded outcomes are reported
/// through [`RateOrigin`], logged and counted.
pub struct ConversionEngine {
    cache: Arc<RateCache>,
    fallback: Arc<FallbackRateTable>,
    counters: EngineCounters,
}

impl ConversionEngine {
    /// Create an engine over a shared cache and fallback table.
    pub fn new(cache: Arc<RateCache>, fallback: Arc<FallbackRateTable>) -> Self {
        Self {
            cache,
            fallback,
            counters: EngineCounters::default(),
        }
    }

    /// Convert `amount` and report where the rate came from.
    #[instrument(skip(self), fields(from = %from, to = %to))]
    pub async fn convert(&self, amount: f64, from: &Currency, to: &Currency) -> Conversion {
        let conversion = self.resolve(amount, from, to).await;
        self.counters.record(conversion.origin);
        conversion
    }

    /// Convert `amount`, returning just the number.
    ///
    /// Equal currencies return `amount` without any lookup. When no rate can
    /// be found the amount comes back unchanged.
    pub async fn convert_amount(&self, amount: f64, from: &Currency, to: &Currency) -> f64 {
        self.convert(amount, from, to).await.value
    }

    /// Convert every line's unit price into `to` and total the cart.
    ///
    /// Each distinct source currency is fetched at most once, with all
    /// fetches in flight together. An empty list yields zero totals.
    #[instrument(skip(self, items), fields(items = items.len(), to = %to))]
    pub async fn convert_line_items(
        &self,
        items: &[LineItem],
        to: &Currency,
        tax_rate: f64,
    ) -> ConversionResult {
        let mut bases: Vec<&Currency> = Vec::new();
        for item in items {
            if item.currency_base != *to && !bases.contains(&&item.currency_base) {
                bases.push(&item.currency_base);
            }
        }

        let fetched = join_all(bases.iter().map(|base| self.cache.get_rates(base))).await;
        let tables: HashMap<&Currency, FxResult<Arc<RateSnapshot>>> =
            bases.into_iter().zip(fetched).collect();
        debug!(bases = tables.len(), "Fetched rate tables for cart");

        let lines: Vec<ConvertedLineItem> = items
            .iter()
            .map(|item| {
                let from = &item.currency_base;
                let unit = match tables.get(from) {
                    Some(table) => self.from_table(item.unit_price_base, from, to, table),
                    None => Conversion::unchanged(item.unit_price_base, RateOrigin::SameCurrency),
                };
                self.counters.record(unit.origin);
                ConvertedLineItem::new(item.clone(), unit)
            })
            .collect();

        let result = ConversionResult::from_lines(to.clone(), lines, tax_rate);
        if result.is_degraded() {
            warn!(total = result.total, "Cart converted with degraded rates");
        }
        result
    }

    /// The underlying rate cache.
    pub fn cache(&self) -> &Arc<RateCache> {
        &self.cache
    }

    /// The fallback table.
    pub fn fallback(&self) -> &FallbackRateTable {
        &self.fallback
    }

    /// Get engine statistics.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            same_currency: self.counters.same_currency.load(Ordering::Relaxed),
            live: self.counters.live.load(Ordering::Relaxed),
            fallback: self.counters.fallback.load(Ordering::Relaxed),
            identity: self.counters.identity.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        }
    }

    async fn resolve(&self, amount: f64, from: &Currency, to: &Currency) -> Conversion {
        if from == to {
            return Conversion::unchanged(amount, RateOrigin::SameCurrency);
        }

        let table = self.cache.get_rates(from).await;
        self.from_table(amount, from, to, &table)
    }

    /// Live rate from `table`, then the fallback table, then identity.
    fn from_table(
        &self,
        amount: f64,
        from: &Currency,
        to: &Currency,
        table: &FxResult<Arc<RateSnapshot>>,
    ) -> Conversion {
        match table {
            Ok(snapshot) => match snapshot.require(to) {
                Ok(rate) => {
                    debug!(from = %from, to = %to, rate, source = snapshot.source(), "Using live rate");
                    return Conversion::at_rate(amount, rate, RateOrigin::Live);
                }
                Err(e) => warn!(error = %e, code = e.error_code(), "Trying fallback"),
            },
            Err(e) => warn!(
                from = %from,
                error = %e,
                code = e.error_code(),
                "Live rates unavailable, trying fallback"
            ),
        }

        if let Some(rate) = self.fallback.lookup(from, to) {
            warn!(from = %from, to = %to, rate, "Using fallback rate");
            return Conversion::at_rate(amount, rate, RateOrigin::Fallback);
        }

        warn!(from = %from, to = %to, "No rate available, returning amount unconverted");
        Conversion::unchanged(amount, RateOrigin::Identity)
    }
}

/// Engine statistics.
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub same_currency: u64,
    pub live: u64,
    pub fallback: u64,
    pub identity: u64,
    pub cache: CacheStats,
}

impl EngineStats {
    /// Conversions that used a fallback rate or none at all.
    pub fn degraded(&self) -> u64 {
        self.fallback + self.identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockRateProvider;

    fn setup_engine() -> (ConversionEngine, Arc<MockRateProvider>) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rates(Currency::usd(), &[("EUR", 0.5), ("GBP", 0.8)]);
        provider.set_rates(Currency::eur(), &[("USD", 2.0)]);

        let cache = Arc::new(RateCache::new(provider.clone()));
        let engine = ConversionEngine::new(cache, Arc::new(FallbackRateTable::builtin()));
        (engine, provider)
    }

    fn failing_engine(fallback: FallbackRateTable) -> (ConversionEngine, Arc<MockRateProvider>) {
        let provider = Arc::new(MockRateProvider::failing("down"));
        let cache = Arc::new(RateCache::new(provider.clone()));
        (ConversionEngine::new(cache, Arc::new(fallback)), provider)
    }

    #[tokio::test]
    async fn test_same_currency_makes_no_request() {
        let (engine, provider) = setup_engine();

        for code in ["USD", "EUR", "XYZ"] {
            let c = Currency::new(code);
            assert_eq!(engine.convert_amount(42.5, &c, &c).await, 42.5);
        }
        assert_eq!(provider.fetch_count(), 0);
        assert_eq!(engine.stats().same_currency, 3);
    }

    #[tokio::test]
    async fn test_live_conversion() {
        let (engine, _) = setup_engine();

        let conversion = engine.convert(100.0, &Currency::usd(), &Currency::eur()).await;

        assert_eq!(conversion.value, 50.0);
        assert_eq!(conversion.rate, Some(0.5));
        assert_eq!(conversion.origin, RateOrigin::Live);
    }

    #[tokio::test]
    async fn test_reciprocal_rates_round_trip() {
        let (engine, _) = setup_engine();
        let amount = 123.25;

        let eur = engine.convert_amount(amount, &Currency::usd(), &Currency::eur()).await;
        let back = engine.convert_amount(eur, &Currency::eur(), &Currency::usd()).await;

        assert_eq!(back, amount);
    }

    #[tokio::test]
    async fn test_missing_target_uses_fallback() {
        let (engine, _) = setup_engine();

        // Live USD table has no JPY; builtin fallback does
        let conversion = engine.convert(10.0, &Currency::usd(), &Currency::jpy()).await;

        assert_eq!(conversion.origin, RateOrigin::Fallback);
        assert_eq!(conversion.value, 1100.0);
    }

    #[tokio::test]
    async fn test_all_endpoints_failed_uses_fallback() {
        let (engine, provider) = failing_engine(FallbackRateTable::builtin());

        let value = engine.convert_amount(100.0, &Currency::usd(), &Currency::eur()).await;

        assert_eq!(value, 100.0 * 0.85);
        assert_eq!(provider.fetch_count(), 1);
        assert_eq!(engine.stats().fallback, 1);
    }

    #[tokio::test]
    async fn test_no_rate_anywhere_returns_amount() {
        let (engine, _) = failing_engine(FallbackRateTable::builtin());

        let conversion = engine
            .convert(100.0, &Currency::new("SEK"), &Currency::new("NOK"))
            .await;

        assert_eq!(conversion.value, 100.0);
        assert_eq!(conversion.origin, RateOrigin::Identity);
        assert!(conversion.is_degraded());
        assert_eq!(engine.stats().degraded(), 1);
    }

    #[tokio::test]
    async fn test_identity_when_fallback_empty() {
        let (engine, _) = failing_engine(FallbackRateTable::empty());

        let value = engine.convert_amount(100.0, &Currency::usd(), &Currency::eur()).await;

        assert_eq!(value, 100.0);
        assert_eq!(engine.stats().identity, 1);
    }

    #[tokio::test]
    async fn test_line_items_same_currency() {
        let (engine, provider) = setup_engine();
        let items = vec![
            LineItem::new("p1", "Cable", 10.0, Currency::usd(), 2),
            LineItem::new("p2", "Adapter", 5.0, Currency::usd(), 1),
        ];

        let result = engine.convert_line_items(&items, &Currency::usd(), 0.1).await;

        assert_eq!(result.subtotal, 25.0);
        assert_eq!(result.tax, 2.5);
        assert_eq!(result.total, 27.5);
        assert_eq!(result.items.len(), 2);
        assert_eq!(provider.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_line_items_mixed_currencies() {
        let (engine, _) = setup_engine();
        let items = vec![
            LineItem::new("p1", "Watch", 100.0, Currency::usd(), 1),
            LineItem::new("p2", "Hub", 20.0, Currency::eur(), 3),
            LineItem::new("p3", "Stand", 7.0, Currency::usd(), 0),
        ];

        let result = engine.convert_line_items(&items, &Currency::eur(), 0.0).await;

        assert_eq!(result.items[0].unit_converted, 50.0);
        assert_eq!(result.items[0].origin, RateOrigin::Live);
        assert_eq!(result.items[1].subtotal_converted, 60.0);
        assert_eq!(result.items[1].origin, RateOrigin::SameCurrency);
        assert_eq!(result.items[2].subtotal_converted, 0.0);
        assert_eq!(result.subtotal, 110.0);
        assert_eq!(result.total, 110.0);
        assert!(!result.is_degraded());
    }

    #[tokio::test]
    async fn test_line_items_empty() {
        let (engine, _) = setup_engine();

        let result = engine.convert_line_items(&[], &Currency::gbp(), 0.2).await;

        assert!(result.items.is_empty());
        assert_eq!(result.total, 0.0);
        assert_eq!(result.currency, Currency::gbp());
    }

    #[tokio::test]
    async fn test_degraded_cart_flagged() {
        let (engine, _) = failing_engine(FallbackRateTable::builtin());
        let items = vec![LineItem::new("p1", "Watch", 100.0, Currency::usd(), 2)];

        let result = engine.convert_line_items(&items, &Currency::gbp(), 0.0).await;

        assert_eq!(result.subtotal, 146.0);
        assert!(result.is_degraded());
    }

    #[tokio::test]
    async fn test_cart_fetches_each_base_once() {
        let (engine, provider) = failing_engine(FallbackRateTable::builtin());
        let items = vec![
            LineItem::new("p1", "Watch", 100.0, Currency::usd(), 1),
            LineItem::new("p2", "Hub", 50.0, Currency::usd(), 2),
            LineItem::new("p3", "Cable", 10.0, Currency::gbp(), 1),
            LineItem::new("p4", "Stand", 20.0, Currency::eur(), 1),
        ];

        let result = engine.convert_line_items(&items, &Currency::eur(), 0.0).await;

        // One failed fetch each for USD and GBP; EUR lines need none
        assert_eq!(provider.fetch_count(), 2);
        assert_eq!(result.items[0].origin, RateOrigin::Fallback);
        assert_eq!(result.items[1].unit_converted, 50.0 * 0.85);
        assert_eq!(result.items[3].origin, RateOrigin::SameCurrency);

        let stats = engine.stats();
        assert_eq!(stats.fallback, 3);
        assert_eq!(stats.same_currency, 1);
        assert_eq!(stats.cache.fetch_failures, 2);
    }

    #[tokio::test]
    async fn test_cached_rates_shared_across_conversions() {
        let (engine, provider) = setup_engine();

        engine.convert_amount(1.0, &Currency::usd(), &Currency::eur()).await;
        engine.convert_amount(1.0, &Currency::usd(), &Currency::gbp()).await;

        assert_eq!(provider.fetch_count(), 1);
        assert_eq!(engine.stats().cache.hits, 1);
    }
}
