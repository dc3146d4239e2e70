//! Money & Currency Display
//!
//! Prices are stored as USD cents. Conversion into a display currency is
//! presentation only and uses `rust_decimal` so rates like 0.92 stay exact.

use std::sync::LazyLock;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A display currency and its rate against USD
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// ISO code (e.g., "EUR")
    pub code: String,

    /// Prefix symbol (e.g., "€")
    pub symbol: String,

    /// Units of this currency per 1 USD
    pub rate: Decimal,

    /// Human-readable name
    pub name: String,
}

impl CurrencyRate {
    fn new(code: &str, symbol: &str, rate: Decimal, name: &str) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            rate,
            name: name.into(),
        }
    }

    /// The base currency
    pub fn usd() -> &'static Self {
        &CURRENCIES[0]
    }

    /// Look up a currency by code (case-insensitive)
    pub fn find(code: &str) -> Option<&'static Self> {
        CURRENCIES
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Convert a USD cent amount into whole units of this currency
    pub fn convert(&self, amount_cents: i64) -> Decimal {
        (cents_to_major(amount_cents) * self.rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Format a USD cent amount in this currency, e.g. "€36"
    pub fn display(&self, amount_cents: i64) -> String {
        format!("{}{}", self.symbol, self.convert(amount_cents).normalize())
    }
}

static CURRENCIES: LazyLock<Vec<CurrencyRate>> = LazyLock::new(|| {
    vec![
        CurrencyRate::new("USD", "$", dec!(1), "US Dollar"),
        CurrencyRate::new("EUR", "€", dec!(0.92), "Euro"),
        CurrencyRate::new("GBP", "£", dec!(0.79), "British Pound"),
        CurrencyRate::new("BDT", "৳", dec!(110), "Bangladeshi Taka"),
        CurrencyRate::new("INR", "₹", dec!(83), "Indian Rupee"),
        CurrencyRate::new("CAD", "C$", dec!(1.35), "Canadian Dollar"),
        CurrencyRate::new("AUD", "A$", dec!(1.52), "Australian Dollar"),
    ]
});

/// All supported display currencies, USD first
pub fn currencies() -> &'static [CurrencyRate] {
    &CURRENCIES
}

/// `round(amount_usd × rate)` with the currency symbol prefixed
pub fn display_price(amount_cents: i64, currency: &CurrencyRate) -> String {
    currency.display(amount_cents)
}

/// Cents to a major-unit decimal (3900 → 39.00)
pub fn cents_to_major(amount_cents: i64) -> Decimal {
    Decimal::new(amount_cents, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_display() {
        assert_eq!(display_price(3900, CurrencyRate::usd()), "$39");
    }

    #[test]
    fn test_eur_display_rounds() {
        let eur = CurrencyRate::find("eur").unwrap();
        // 39 × 0.92 = 35.88
        assert_eq!(eur.convert(3900), dec!(36));
        assert_eq!(display_price(3900, eur), "€36");
    }

    #[test]
    fn test_half_rounds_up() {
        let usd = CurrencyRate::usd();
        assert_eq!(usd.display(3950), "$40");
        assert_eq!(usd.display(3949), "$39");
    }

    #[test]
    fn test_unknown_currency() {
        assert!(CurrencyRate::find("XYZ").is_none());
        assert_eq!(currencies().len(), 7);
    }
}
