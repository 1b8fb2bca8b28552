//! Numeric price formatting, independent of any rendering layer.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;

/// Prices below this are shown with a compressed run of leading zeros
const SUBSCRIPT_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
const MAX_SIGNIFICANT_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PriceDisplay {
    Zero,
    /// Two-decimal fixed notation, e.g. `"1.23"`
    Fixed(String),
    /// `0.0{leading_zero_count}{significant_digits}`, e.g. 0.000123 -> (3, "123")
    Subscript {
        leading_zero_count: usize,
        significant_digits: String,
    },
}

impl fmt::Display for PriceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDisplay::Zero => write!(f, "$0.00"),
            PriceDisplay::Fixed(value) => write!(f, "${}", value),
            PriceDisplay::Subscript {
                leading_zero_count,
                significant_digits,
            } => write!(f, "$0.0({}){}", leading_zero_count, significant_digits),
        }
    }
}

pub fn format_price(price: Decimal) -> PriceDisplay {
    if price.is_zero() {
        return PriceDisplay::Zero;
    }

    if price.is_sign_positive() && price < SUBSCRIPT_THRESHOLD {
        let text = price.normalize().to_string();
        if let Some(fraction) = text.strip_prefix("0.") {
            let leading_zero_count = fraction.chars().take_while(|c| *c == '0').count();
            let significant_digits: String = fraction[leading_zero_count..]
                .chars()
                .take(MAX_SIGNIFICANT_DIGITS)
                .collect();

            return PriceDisplay::Subscript {
                leading_zero_count,
                significant_digits,
            };
        }
    }

    let rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    PriceDisplay::Fixed(format!("{:.2}", rounded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn price(text: &str) -> Decimal {
        Decimal::from_str(text).unwrap()
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_price(Decimal::ZERO), PriceDisplay::Zero);
        assert_eq!(format_price(Decimal::ZERO).to_string(), "$0.00");
    }

    #[test]
    fn test_fixed_two_decimals() {
        assert_eq!(format_price(price("1.5")), PriceDisplay::Fixed("1.50".to_string()));
        assert_eq!(format_price(price("123.456")).to_string(), "$123.46");
        assert_eq!(format_price(price("0.01")).to_string(), "$0.01");
    }

    #[test]
    fn test_subscript_small_prices() {
        assert_eq!(
            format_price(price("0.000123456")),
            PriceDisplay::Subscript {
                leading_zero_count: 3,
                significant_digits: "123".to_string(),
            }
        );
        assert_eq!(format_price(price("0.005")).to_string(), "$0.0(2)5");
    }

    #[test]
    fn test_trailing_zeros_ignored() {
        assert_eq!(
            format_price(price("0.00120000")),
            PriceDisplay::Subscript {
                leading_zero_count: 2,
                significant_digits: "12".to_string(),
            }
        );
    }
}
