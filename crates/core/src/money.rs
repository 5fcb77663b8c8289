//! Currency presentation.
//!
//! Amounts are stored unrounded; rounding to two decimals happens only here.

use serde::{Deserialize, Serialize};

/// Renders amounts as `{symbol}{amount:.2}`, e.g. `$27.00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub symbol: String,
}

impl CurrencyFormat {
    pub const DEFAULT_SYMBOL: &'static str = "$";

    pub fn new(symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let symbol = symbol.trim();
        Self {
            symbol: if symbol.is_empty() {
                Self::DEFAULT_SYMBOL.to_string()
            } else {
                symbol.to_string()
            },
        }
    }

    pub fn format(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        if amount < 0.0 {
            format!("-{}{:.2}", self.symbol, -amount)
        } else {
            format!("{}{:.2}", self.symbol, amount)
        }
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SYMBOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_two_decimals() {
        let fmt = CurrencyFormat::default();
        assert_eq!(fmt.format(27.0), "$27.00");
        assert_eq!(fmt.format(2.005), "$2.00");
        assert_eq!(fmt.format(-5.5), "-$5.50");
        assert_eq!(fmt.format(f64::NAN), "$0.00");
    }

    #[test]
    fn blank_symbol_falls_back_to_default() {
        assert_eq!(CurrencyFormat::new("  ").symbol, "$");
        assert_eq!(CurrencyFormat::new("€").format(1.5), "€1.50");
    }
}
