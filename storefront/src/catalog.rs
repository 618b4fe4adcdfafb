//! Demo product catalog with sorting and name search.

use std::cmp::Ordering;
use std::str::FromStr;

use fxnorm_collections::{merge_sort_by, Trie};
use fxnorm_common::{Currency, Product, ProductId};

/// Number of suggestions returned when no limit is given.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 6;

/// Catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    /// Catalog order.
    Featured,
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "price-asc" => Ok(ProductSort::PriceAsc),
            "price-desc" => Ok(ProductSort::PriceDesc),
            "name-asc" => Ok(ProductSort::NameAsc),
            "name-desc" => Ok(ProductSort::NameDesc),
            "featured" => Ok(ProductSort::Featured),
            other => Err(format!(
                "unknown sort '{}' (expected price-asc, price-desc, name-asc, name-desc or featured)",
                other
            )),
        }
    }
}

fn by_price(a: &Product, b: &Product) -> Ordering {
    a.price_base
        .partial_cmp(&b.price_base)
        .unwrap_or(Ordering::Equal)
}

fn by_name(a: &Product, b: &Product) -> Ordering {
    a.name.to_lowercase().cmp(&b.name.to_lowercase())
}

/// A sorted copy of `products`. Ties keep their input order.
pub fn sort_products(products: &[Product], sort: ProductSort) -> Vec<Product> {
    match sort {
        ProductSort::PriceAsc => merge_sort_by(products, by_price),
        ProductSort::PriceDesc => merge_sort_by(products, |a, b| by_price(b, a)),
        ProductSort::NameAsc => merge_sort_by(products, by_name),
        ProductSort::NameDesc => merge_sort_by(products, |a, b| by_name(b, a)),
        ProductSort::Featured => products.to_vec(),
    }
}

/// Products plus a prefix index over their lower-cased names.
pub struct Catalog {
    products: Vec<Product>,
    index: Trie<ProductId>,
}

impl Catalog {
    /// Build a catalog and its search index.
    pub fn new(products: Vec<Product>) -> Self {
        let index = products
            .iter()
            .map(|p| (p.name.to_lowercase(), p.id.clone()))
            .collect();
        Self { products, index }
    }

    /// The six demo products, priced in USD.
    pub fn demo() -> Self {
        let usd = Currency::usd;
        Self::new(vec![
            Product::new("p1", "Wireless Headphones", "ANC over-ear with 30h battery.", 149.99, usd()),
            Product::new("p2", "Smart Watch", "AMOLED display, GPS, HRV tracking.", 199.0, usd()),
            Product::new("p3", "Mechanical Keyboard", "Low-profile, hot-swappable switches.", 109.0, usd()),
            Product::new("p4", "USB-C Hub", "8-in-1, 100W PD, HDMI 4K.", 59.0, usd()),
            Product::new("p5", "4K Webcam", "Autofocus, dual mics, privacy shutter.", 129.0, usd()),
            Product::new("p6", "Portable SSD 1TB", "USB 3.2 Gen2, 1,000 MB/s.", 139.0, usd()),
        ])
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// Products to list, optionally narrowed by `query`, in `sort` order.
    pub fn listing(&self, sort: ProductSort, query: Option<&str>) -> Vec<Product> {
        match query {
            Some(query) => {
                let matched: Vec<Product> = self.filter(query).into_iter().cloned().collect();
                sort_products(&matched, sort)
            }
            None => sort_products(self.products(), sort),
        }
    }

    /// Products whose name or description contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Products whose name starts with `prefix`, up to `limit`.
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<&Product> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }

        self.index
            .suggest(&prefix, limit)
            .into_iter()
            .flat_map(|s| s.payloads)
            .filter_map(|id| self.get(id.as_str()))
            .take(limit)
            .collect()
    }
}
