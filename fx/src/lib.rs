//! fxnorm FX Engine
//!
//! Currency normalization for storefront prices and carts.
//!
//! # Features
//!
//! - Full rate tables fetched per base currency from an ordered list of
//!   HTTP endpoints, with sequential failover
//! - LRU rate cache with a staleness window
//! - Static fallback table for major pairs when every endpoint is down
//! - Line item conversion with subtotal, tax and total
//!
//! # Example
//!
//! ```rust,ignore
//! use fxnorm_fx::FxConfig;
//! use fxnorm_common::{Currency, LineItem};
//!
//! let engine = FxConfig::from_env().build_engine()?;
//!
//! let eur = engine.convert_amount(100.0, &Currency::usd(), &Currency::eur()).await;
//!
//! let cart = vec![LineItem::new("p1", "Watch", 199.0, Currency::usd(), 1)];
//! let result = engine.convert_line_items(&cart, &Currency::gbp(), 0.2).await;
//! ```

pub mod cache;
pub mod config;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod http;
pub mod provider;
pub mod snapshot;

pub use cache::{CacheStats, RateCache, RateCacheConfig};
pub use config::FxConfig;
pub use conversion::{Conversion, ConversionResult, ConvertedLineItem, RateOrigin};
pub use engine::{ConversionEngine, EngineStats};
pub use error::{FxError, FxResult};
pub use fallback::FallbackRateTable;
pub use http::HttpRateProvider;
pub use provider::{FailoverRateProvider, RateProvider};
pub use snapshot::RateSnapshot;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
