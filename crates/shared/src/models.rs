use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest scale `Decimal` can carry directly
const MAX_DECIMAL_SCALE: u8 = 28;

/// Descriptive registry record for a mint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub source_uri: String,
    pub image_url: Option<String>,
}

/// One token account as shown to the wallet holder, rebuilt on every discovery pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenAccountView {
    pub account_address: String,
    pub mint_address: String,
    /// Held amount in base units, as read from the ledger. Burns use this, never `quantity`.
    pub raw_amount: u64,
    /// `raw_amount` scaled by `decimals`, for display and valuation
    pub quantity: Decimal,
    pub decimals: u8,
    pub metadata: Option<TokenMetadata>,
    pub unit_price: Option<Decimal>,
}

impl TokenAccountView {
    /// Held value in the reference currency; zero while the price is unresolved.
    pub fn total_value(&self) -> Decimal {
        match self.unit_price {
            Some(price) => price.checked_mul(self.quantity).unwrap_or(Decimal::MAX),
            None => Decimal::ZERO,
        }
    }

    pub fn has_balance(&self) -> bool {
        self.raw_amount > 0
    }

    pub fn display_name(&self) -> &str {
        self.metadata
            .as_ref()
            .map(|m| m.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown Token")
    }

    pub fn symbol(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .map(|m| m.symbol.as_str())
            .filter(|symbol| !symbol.is_empty())
    }

    /// Display ordering: total value descending, then quantity ascending.
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .total_value()
            .cmp(&self.total_value())
            .then_with(|| self.quantity.cmp(&other.quantity))
    }
}

/// Convert a raw on-chain integer amount into a decimal quantity.
///
/// Exact up to 28 decimals. Beyond that the quantity is rounded, so callers needing the exact
/// amount keep the raw value alongside.
pub fn quantity_from_raw(raw: u64, decimals: u8) -> Decimal {
    if decimals <= MAX_DECIMAL_SCALE {
        return Decimal::from_i128_with_scale(raw as i128, decimals as u32);
    }

    let mut quantity = Decimal::from_i128_with_scale(raw as i128, MAX_DECIMAL_SCALE as u32);
    for _ in MAX_DECIMAL_SCALE..decimals {
        quantity /= Decimal::TEN;
    }
    quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn view(quantity: &str, price: Option<&str>) -> TokenAccountView {
        TokenAccountView {
            account_address: "acct".to_string(),
            mint_address: "mint".to_string(),
            raw_amount: 0,
            quantity: Decimal::from_str(quantity).unwrap(),
            decimals: 6,
            metadata: None,
            unit_price: price.map(|p| Decimal::from_str(p).unwrap()),
        }
    }

    #[test]
    fn test_total_value_without_price_is_zero() {
        assert_eq!(view("42", None).total_value(), Decimal::ZERO);
    }

    #[test]
    fn test_total_value_with_price() {
        assert_eq!(
            view("2.5", Some("4")).total_value(),
            Decimal::from_str("10").unwrap()
        );
    }

    #[test]
    fn test_display_order_value_descending() {
        let cheap = view("100", Some("0.01"));
        let rich = view("1", Some("50"));

        assert_eq!(rich.display_order(&cheap), Ordering::Less);
        assert_eq!(cheap.display_order(&rich), Ordering::Greater);
    }

    #[test]
    fn test_display_order_quantity_tie_break() {
        let small = view("1", None);
        let large = view("9", None);

        assert_eq!(small.display_order(&large), Ordering::Less);
    }

    #[test]
    fn test_display_name_fallback() {
        let mut token = view("1", None);
        assert_eq!(token.display_name(), "Unknown Token");
        assert_eq!(token.symbol(), None);

        token.metadata = Some(TokenMetadata {
            name: "Bonk".to_string(),
            symbol: "BONK".to_string(),
            source_uri: String::new(),
            image_url: None,
        });
        assert_eq!(token.display_name(), "Bonk");
        assert_eq!(token.symbol(), Some("BONK"));
    }

    #[test]
    fn test_quantity_scaling() {
        assert_eq!(quantity_from_raw(5_000_000, 6), Decimal::from(5));
        assert_eq!(
            quantity_from_raw(1, 9),
            Decimal::from_str("0.000000001").unwrap()
        );
        assert_eq!(quantity_from_raw(0, 6), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_scaling_beyond_decimal_precision() {
        let quantity = quantity_from_raw(u64::MAX, 30);
        assert!(quantity > Decimal::ZERO);
        assert!(quantity < Decimal::ONE);
    }

    #[test]
    fn test_balance_follows_raw_amount() {
        let mut token = view("0", None);
        token.decimals = 40;
        token.raw_amount = 1;
        assert!(token.has_balance());

        token.raw_amount = 0;
        assert!(!token.has_balance());
    }
}
