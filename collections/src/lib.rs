//! fxnorm Collections
//!
//! General-purpose data structures backing the conversion engine and the
//! product search feature.
//!
//! - [`LruCache`]: fixed-capacity cache with O(1) `get`/`put` and
//!   least-recently-used eviction. No expiry; callers layer TTLs on top.
//! - [`Trie`]: prefix tree with per-word payload lists for autocomplete.
//! - [`merge_sort_by`]: stable, non-mutating O(n log n) merge sort.
//!
//! # Example
//!
//! ```rust
//! use std::num::NonZeroUsize;
//! use fxnorm_collections::LruCache;
//!
//! let mut cache = LruCache::new(NonZeroUsize::new(2).unwrap());
//! cache.put("USD", 1.0);
//! cache.put("EUR", 0.92);
//! cache.get("USD");
//! let evicted = cache.put("GBP", 0.78);
//! assert_eq!(evicted, Some(("EUR", 0.92)));
//! ```

pub mod lru;
pub mod trie;
pub mod sort;

pub use lru::LruCache;
pub use trie::{Suggestion, Trie};
pub use sort::{merge_sort, merge_sort_by};
