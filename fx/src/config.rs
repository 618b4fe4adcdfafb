//! Engine configuration.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use fxnorm_common::{constants, DurationExt};
use tracing::debug;

use crate::cache::{RateCache, RateCacheConfig, DEFAULT_CACHE_CAPACITY};
use crate::engine::ConversionEngine;
use crate::error::{FxError, FxResult};
use crate::fallback::FallbackRateTable;
use crate::http::BASE_PLACEHOLDER;
use crate::provider::FailoverRateProvider;

/// Public endpoints tried in this order.
pub const DEFAULT_ENDPOINTS: &[&str] = &[
    "https://api.exchangerate.host/latest?base={base}",
    "https://api.fxratesapi.com/latest?base={base}",
    "https://open.er-api.com/v6/latest/{base}",
];

/// Main engine configuration.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Endpoint URL templates in priority order.
    pub endpoints: Vec<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// How long a fetched rate table is served from cache.
    pub staleness_window: Duration,
    /// Maximum number of base currencies cached.
    pub cache_capacity: usize,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            endpoints: DEFAULT_ENDPOINTS.iter().map(|s| s.to_string()).collect(),
            request_timeout: constants::rate_request_timeout().as_std(),
            staleness_window: constants::rate_staleness_window().as_std(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoints) = lookup("FX_ENDPOINTS") {
            config.endpoints = endpoints
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(ms) = lookup("FX_REQUEST_TIMEOUT_MS") {
            if let Ok(ms) = ms.trim().parse() {
                config.request_timeout = Duration::from_millis(ms);
            }
        }

        if let Some(secs) = lookup("FX_STALENESS_SECS") {
            if let Ok(secs) = secs.trim().parse() {
                config.staleness_window = Duration::from_secs(secs);
            }
        }

        if let Some(capacity) = lookup("FX_CACHE_CAPACITY") {
            if let Ok(capacity) = capacity.trim().parse() {
                config.cache_capacity = capacity;
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoints.is_empty() {
            return Err("At least one rate endpoint is required".to_string());
        }

        if let Some(bad) = self.endpoints.iter().find(|e| !e.contains(BASE_PLACEHOLDER)) {
            return Err(format!(
                "Endpoint '{}' is missing the {} placeholder",
                bad, BASE_PLACEHOLDER
            ));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        if self.staleness_window.is_zero() {
            return Err("Staleness window cannot be 0".to_string());
        }

        if self.cache_capacity == 0 {
            return Err("Cache capacity cannot be 0".to_string());
        }

        Ok(())
    }

    /// Cache settings derived from this configuration.
    pub fn cache_config(&self) -> FxResult<RateCacheConfig> {
        let capacity = NonZeroUsize::new(self.cache_capacity)
            .ok_or_else(|| FxError::InvalidConfig("Cache capacity cannot be 0".to_string()))?;
        let staleness_window = chrono::Duration::from_std(self.staleness_window)
            .map_err(|e| FxError::InvalidConfig(format!("Staleness window: {}", e)))?;

        Ok(RateCacheConfig {
            capacity,
            staleness_window,
        })
    }

    /// Build the failover chain over the configured endpoints.
    pub fn build_provider(&self) -> FxResult<FailoverRateProvider> {
        FailoverRateProvider::from_templates(&self.endpoints, self.request_timeout)
    }

    /// Assemble provider, cache and engine with the builtin fallback table.
    pub fn build_engine(&self) -> FxResult<ConversionEngine> {
        self.validate().map_err(FxError::InvalidConfig)?;

        let provider = Arc::new(self.build_provider()?);
        let cache = Arc::new(RateCache::with_config(provider, self.cache_config()?));

        debug!(
            endpoints = self.endpoints.len(),
            capacity = self.cache_capacity,
            staleness_secs = self.staleness_window.as_secs(),
            "Built conversion engine"
        );

        Ok(ConversionEngine::new(
            cache,
            Arc::new(FallbackRateTable::builtin()),
        ))
    }
}
