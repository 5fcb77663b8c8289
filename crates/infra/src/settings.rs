use serde::{Deserialize, Serialize};

use nexus_core::CurrencyFormat;

/// Business details shown on documents, plus the currency symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub business_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            currency_symbol: CurrencyFormat::DEFAULT_SYMBOL.to_string(),
        }
    }
}

impl Settings {
    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_symbol.as_str())
    }
}
