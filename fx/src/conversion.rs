//! Currency conversion result types.

use fxnorm_common::{format_amount, Currency, LineItem};
use serde::{Deserialize, Serialize};

/// Where the rate behind a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// Source and target currencies were equal; no lookup made.
    SameCurrency,
    /// Live or freshly cached provider rate.
    Live,
    /// Static fallback table.
    Fallback,
    /// No rate anywhere; the amount was passed through unchanged.
    Identity,
}

impl RateOrigin {
    /// Whether the result is approximate or unconverted.
    pub fn is_degraded(&self) -> bool {
        matches!(self, RateOrigin::Fallback | RateOrigin::Identity)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateOrigin::SameCurrency => "same_currency",
            RateOrigin::Live => "live",
            RateOrigin::Fallback => "fallback",
            RateOrigin::Identity => "identity",
        }
    }
}

impl std::fmt::Display for RateOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single converted amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    /// Amount in the source currency.
    pub input: f64,
    /// Amount in the target currency.
    pub value: f64,
    /// Multiplier applied, if any.
    pub rate: Option<f64>,
    /// Where the multiplier came from.
    pub origin: RateOrigin,
}

impl Conversion {
    /// Convert `input` at `rate`.
    pub fn at_rate(input: f64, rate: f64, origin: RateOrigin) -> Self {
        Self {
            input,
            value: input * rate,
            rate: Some(rate),
            origin,
        }
    }

    /// Pass `input` through unconverted.
    pub fn unchanged(input: f64, origin: RateOrigin) -> Self {
        Self {
            input,
            value: input,
            rate: None,
            origin,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.origin.is_degraded()
    }
}

/// A line item with its converted prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    /// Unit price in the target currency.
    pub unit_converted: f64,
    /// `unit_converted * quantity`.
    pub subtotal_converted: f64,
    pub origin: RateOrigin,
}

impl ConvertedLineItem {
    pub fn new(item: LineItem, unit: Conversion) -> Self {
        let subtotal_converted = unit.value * f64::from(item.quantity);
        Self {
            item,
            unit_converted: unit.value,
            subtotal_converted,
            origin: unit.origin,
        }
    }
}

/// Totals for a list of line items in one target currency.
///
/// Recomputed on every call; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Target currency of every amount below.
    pub currency: Currency,
    pub items: Vec<ConvertedLineItem>,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax: f64,
    pub total: f64,
}

impl ConversionResult {
    /// Sum converted lines and apply tax.
    pub fn from_lines(currency: Currency, items: Vec<ConvertedLineItem>, tax_rate: f64) -> Self {
        let subtotal: f64 = items.iter().map(|line| line.subtotal_converted).sum();
        let tax = subtotal * tax_rate;
        Self {
            currency,
            items,
            subtotal,
            tax_rate,
            tax,
            total: subtotal + tax,
        }
    }

    /// Whether any line used a fallback rate or was left unconverted.
    pub fn is_degraded(&self) -> bool {
        self.items.iter().any(|line| line.origin.is_degraded())
    }

    /// Human-readable summary lines, rounded for display.
    pub fn summary(&self) -> Vec<String> {
        vec![
            format!("Subtotal: {}", format_amount(self.subtotal, &self.currency)),
            format!(
                "Tax ({:.2}%): {}",
                self.tax_rate * 100.0,
                format_amount(self.tax, &self.currency)
            ),
            format!("Total: {}", format_amount(self.total, &self.currency)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, qty: u32) -> LineItem {
        LineItem::new("p1", "Item", price, Currency::usd(), qty)
    }

    #[test]
    fn test_conversion_at_rate() {
        let conversion = Conversion::at_rate(100.0, 0.85, RateOrigin::Fallback);
        assert_eq!(conversion.value, 85.0);
        assert_eq!(conversion.rate, Some(0.85));
        assert!(conversion.is_degraded());
    }

    #[test]
    fn test_result_totals() {
        let items = vec![
            ConvertedLineItem::new(line(10.0, 2), Conversion::unchanged(10.0, RateOrigin::SameCurrency)),
            ConvertedLineItem::new(line(5.0, 1), Conversion::unchanged(5.0, RateOrigin::SameCurrency)),
        ];
        let result = ConversionResult::from_lines(Currency::usd(), items, 0.1);

        assert_eq!(result.subtotal, 25.0);
        assert_eq!(result.tax, 2.5);
        assert_eq!(result.total, 27.5);
        assert!(!result.is_degraded());
        assert_eq!(
            result.summary(),
            vec!["Subtotal: 25.00 USD", "Tax (10.00%): 2.50 USD", "Total: 27.50 USD"]
        );
    }

    #[test]
    fn test_empty_result_is_zero() {
        let result = ConversionResult::from_lines(Currency::eur(), Vec::new(), 0.07);
        assert_eq!(result.subtotal, 0.0);
        assert_eq!(result.tax, 0.0);
        assert_eq!(result.total, 0.0);
        assert!(!result.is_degraded());
    }

    #[test]
    fn test_converted_line_serializes_flat() {
        let converted = ConvertedLineItem::new(line(10.0, 3), Conversion::at_rate(10.0, 2.0, RateOrigin::Live));
        let json = serde_json::to_value(&converted).unwrap();

        assert_eq!(json["id"], "p1");
        assert_eq!(json["unit_converted"], 20.0);
        assert_eq!(json["subtotal_converted"], 60.0);
        assert_eq!(json["origin"], "live");
    }
}
