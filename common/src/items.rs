//! Records supplied by cart and catalog code.

use serde::{Deserialize, Serialize};

use crate::identifiers::ProductId;
use crate::monetary::Currency;

/// One cart line as handed to the conversion engine.
///
/// The engine reads these but never owns or mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price in `currency_base`.
    pub unit_price_base: f64,
    /// Currency the unit price is quoted in.
    pub currency_base: Currency,
    /// Number of units.
    pub quantity: u32,
}

impl LineItem {
    /// Create a new line item.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price_base: f64,
        currency_base: Currency,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price_base,
            currency_base,
            quantity,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// List price in `currency_base`.
    pub price_base: f64,
    /// Currency the list price is quoted in.
    pub currency_base: Currency,
}

impl Product {
    /// Create a new product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        description: impl Into<String>,
        price_base: f64,
        currency_base: Currency,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price_base,
            currency_base,
        }
    }

    /// Build a cart line for `quantity` units of this product.
    pub fn line_item(&self, quantity: u32) -> LineItem {
        LineItem {
            id: self.id.clone(),
            name: self.name.clone(),
            unit_price_base: self.price_base,
            currency_base: self.currency_base.clone(),
            quantity,
        }
    }
}
