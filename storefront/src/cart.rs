//! Cart assembly from command-line entries.

use anyhow::{anyhow, bail, Context};
use fxnorm_common::LineItem;

use crate::catalog::Catalog;

/// One `ID=QTY` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub product_id: String,
    pub quantity: u32,
}

impl std::str::FromStr for CartEntry {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, qty) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected ID=QTY, got '{}'", s))?;

        let product_id = id.trim();
        if product_id.is_empty() {
            bail!("missing product id in '{}'", s);
        }

        let quantity = qty
            .trim()
            .parse()
            .with_context(|| format!("invalid quantity in '{}'", s))?;

        Ok(Self {
            product_id: product_id.to_string(),
            quantity,
        })
    }
}

/// Resolve entries against the catalog. Repeated ids are merged.
pub fn build_line_items(catalog: &Catalog, entries: &[CartEntry]) -> anyhow::Result<Vec<LineItem>> {
    let mut items: Vec<LineItem> = Vec::with_capacity(entries.len());

    for entry in entries {
        let product = catalog
            .get(&entry.product_id)
            .ok_or_else(|| anyhow!("unknown product '{}'", entry.product_id))?;

        match items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(entry.quantity)
                    .ok_or_else(|| anyhow!("quantity overflow for '{}'", entry.product_id))?;
            }
            None => items.push(product.line_item(entry.quantity)),
        }
    }

    Ok(items)
}
