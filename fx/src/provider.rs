//! Rate provider traits and implementations.

use async_trait::async_trait;
use fxnorm_common::Currency;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FxError, FxResult};
use crate::http::HttpRateProvider;
use crate::snapshot::RateSnapshot;

/// Source of full rate tables.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch every rate quoted against `base`.
    ///
    /// The returned snapshot always has `rates[base] == 1`.
    async fn fetch_rate_table(&self, base: &Currency) -> FxResult<RateSnapshot>;
}

/// Tries providers strictly in priority order, one request at a time.
///
/// The first success wins and later providers are not contacted. If all
/// fail the error lists every provider that was attempted.
pub struct FailoverRateProvider {
    providers: Vec<Arc<dyn RateProvider>>,
}

impl FailoverRateProvider {
    /// Create a failover chain; earlier providers have higher priority.
    pub fn new(providers: Vec<Arc<dyn RateProvider>>) -> Self {
        Self { providers }
    }

    /// Build a chain of HTTP endpoints from URL templates containing `{base}`.
    pub fn from_templates<S: AsRef<str>>(templates: &[S], timeout: Duration) -> FxResult<Self> {
        let providers = templates
            .iter()
            .map(|template| {
                HttpRateProvider::new(template.as_ref(), timeout)
                    .map(|p| Arc::new(p) as Arc<dyn RateProvider>)
            })
            .collect::<FxResult<Vec<_>>>()?;
        Ok(Self::new(providers))
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in priority order.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

#[async_trait]
impl RateProvider for FailoverRateProvider {
    fn name(&self) -> &str {
        "FAILOVER"
    }

    async fn fetch_rate_table(&self, base: &Currency) -> FxResult<RateSnapshot> {
        let mut attempted = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            debug!(provider = provider.name(), base = %base, "Requesting rate table");

            match provider.fetch_rate_table(base).await {
                Ok(snapshot) => {
                    info!(
                        provider = provider.name(),
                        base = %base,
                        rates = snapshot.len(),
                        failed_before = attempted.len(),
                        "Fetched rate table"
                    );
                    return Ok(snapshot);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        base = %base,
                        error = %e,
                        code = e.error_code(),
                        transient = e.is_transient(),
                        "Provider failed to return rate table"
                    );
                    attempted.push(provider.name().to_string());
                }
            }
        }

        Err(FxError::AllEndpointsFailed {
            base: base.clone(),
            attempted,
        })
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    tables: dashmap::DashMap<Currency, Vec<(Currency, f64)>>,
    failing: std::sync::atomic::AtomicBool,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider with no tables.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// A provider whose every fetch fails.
    pub fn failing(name: impl Into<String>) -> Self {
        let provider = Self::new(name);
        provider.set_failing(true);
        provider
    }

    /// Set the rate table served for `base`.
    pub fn set_rates(&self, base: Currency, rates: &[(&str, f64)]) {
        let rates = rates
            .iter()
            .map(|(code, rate)| (Currency::new(*code), *rate))
            .collect();
        self.tables.insert(base, rates);
    }

    /// Make every subsequent fetch fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetches attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rate_table(&self, base: &Currency) -> FxResult<RateSnapshot> {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(FxError::Endpoint {
                endpoint: self.name.clone(),
                reason: "unavailable".to_string(),
            });
        }

        self.tables
            .get(base)
            .map(|rates| RateSnapshot::new(base.clone(), rates.clone(), self.name.clone()))
            .ok_or_else(|| FxError::Endpoint {
                endpoint: self.name.clone(),
                reason: format!("no table for {}", base),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_provider(name: &str, eur: f64) -> Arc<MockRateProvider> {
        let provider = Arc::new(MockRateProvider::new(name));
        provider.set_rates(Currency::usd(), &[("EUR", eur), ("USD", 0.5)]);
        provider
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = usd_provider("test", 0.92);
        let snapshot = provider.fetch_rate_table(&Currency::usd()).await.unwrap();

        assert_eq!(snapshot.rate(&Currency::eur()), Some(0.92));
        assert_eq!(snapshot.rate(&Currency::usd()), Some(1.0));
        assert_eq!(snapshot.source(), "test");
        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failover_uses_first_success_only() {
        let p1 = Arc::new(MockRateProvider::failing("p1"));
        let p2 = usd_provider("p2", 0.91);
        let p3 = usd_provider("p3", 0.95);

        let failover = FailoverRateProvider::new(vec![p1.clone(), p2.clone(), p3.clone()]);
        let snapshot = failover.fetch_rate_table(&Currency::usd()).await.unwrap();

        assert_eq!(snapshot.rate(&Currency::eur()), Some(0.91));
        assert_eq!(snapshot.source(), "p2");
        assert_eq!(p1.fetch_count(), 1);
        assert_eq!(p2.fetch_count(), 1);
        assert_eq!(p3.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_failover_all_failed() {
        let p1 = Arc::new(MockRateProvider::failing("p1"));
        let p2 = Arc::new(MockRateProvider::new("p2"));

        let failover = FailoverRateProvider::new(vec![p1, p2]);
        let result = failover.fetch_rate_table(&Currency::gbp()).await;

        match result {
            Err(FxError::AllEndpointsFailed { base, attempted }) => {
                assert_eq!(base, Currency::gbp());
                assert_eq!(attempted, vec!["p1".to_string(), "p2".to_string()]);
            }
            other => panic!("expected AllEndpointsFailed, got {:?}", other.map(|s| s.len())),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let failover = FailoverRateProvider::new(Vec::new());
        assert!(failover.is_empty());

        let result = failover.fetch_rate_table(&Currency::usd()).await;
        assert!(matches!(
            result,
            Err(FxError::AllEndpointsFailed { ref attempted, .. }) if attempted.is_empty()
        ));
    }

    #[test]
    fn test_from_templates_keeps_order() {
        let failover = FailoverRateProvider::from_templates(
            &["http://a.test/latest?base={base}", "http://b.test/{base}"],
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            failover.provider_names(),
            vec!["http://a.test/latest?base={base}", "http://b.test/{base}"]
        );
    }
}
