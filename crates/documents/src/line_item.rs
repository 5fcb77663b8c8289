use serde::{Deserialize, Serialize};

use nexus_core::numeric;

/// One row of a financial document.
///
/// Numeric fields are coerced on the way in: anything that is not a finite
/// number becomes `0.0`. Negative values and tax rates above 100 are kept as
/// given.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "numeric::deserialize_lenient")]
    pub quantity: f64,
    /// Price per unit. Stored unrounded.
    #[serde(default, deserialize_with = "numeric::deserialize_lenient")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "numeric::deserialize_lenient")]
    pub tax_rate_percent: f64,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
        tax_rate_percent: f64,
    ) -> Self {
        let finite = |n: f64| if n.is_finite() { n } else { 0.0 };
        Self {
            description: description.into(),
            quantity: finite(quantity),
            unit_price: finite(unit_price),
            tax_rate_percent: finite(tax_rate_percent),
        }
    }

    /// Build a line from raw form text.
    pub fn from_form(description: &str, quantity: &str, unit_price: &str, tax_rate_percent: &str) -> Self {
        Self {
            description: description.trim().to_string(),
            quantity: numeric::parse_lenient(quantity),
            unit_price: numeric::parse_lenient(unit_price),
            tax_rate_percent: numeric::parse_lenient(tax_rate_percent),
        }
    }

    /// `quantity × unit_price`, unrounded.
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// `amount × tax_rate_percent / 100`, unrounded.
    pub fn tax(&self) -> f64 {
        self.amount() * self.tax_rate_percent / 100.0
    }
}
