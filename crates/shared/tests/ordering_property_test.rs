// Property tests for the display ordering of token account views

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::TokenAccountView;

fn arb_view() -> impl Strategy<Value = TokenAccountView> {
    (
        0u64..1_000_000,
        0u32..4,
        proptest::option::of(0u64..10_000),
    )
        .prop_map(|(raw, scale, price_cents)| TokenAccountView {
            account_address: format!("acct-{}", raw),
            mint_address: format!("mint-{}", raw),
            raw_amount: raw,
            quantity: Decimal::new(raw as i64, scale),
            decimals: scale as u8,
            metadata: None,
            unit_price: price_cents.map(|cents| Decimal::new(cents as i64, 2)),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Higher total value always comes first; equal values fall back to smaller quantity first.
    #[test]
    fn prop_sorted_views_respect_value_then_quantity(mut views in proptest::collection::vec(arb_view(), 0..40)) {
        views.sort_by(|a, b| a.display_order(b));

        for pair in views.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.total_value() >= b.total_value());
            if a.total_value() == b.total_value() {
                prop_assert!(a.quantity <= b.quantity);
            }
        }
    }

    #[test]
    fn prop_unpriced_views_count_as_zero(raw in 0u64..1_000_000) {
        let view = TokenAccountView {
            account_address: "acct".to_string(),
            mint_address: "mint".to_string(),
            raw_amount: raw,
            quantity: Decimal::from(raw),
            decimals: 0,
            metadata: None,
            unit_price: None,
        };
        prop_assert_eq!(view.total_value(), Decimal::ZERO);
    }
}
