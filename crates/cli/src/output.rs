use reclaim::CloseReceipt;
use shared::format::format_price;
use shared::links::{chart_link, swap_link};
use shared::TokenAccountView;

/// One listing entry, several lines
pub fn render_view(position: usize, view: &TokenAccountView, selected: bool) -> String {
    let marker = if selected { "[x]" } else { "[ ]" };
    let label = match view.symbol() {
        Some(symbol) => format!("{} ({})", view.display_name(), symbol),
        None => view.display_name().to_string(),
    };
    let price = view
        .unit_price
        .map(|price| format_price(price).to_string())
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{:>3}. {} {}\n     mint:     {}\n     account:  {}\n     quantity: {}  price: {}  value: {}\n     chart:    {}\n     swap:     {}",
        position,
        marker,
        label,
        view.mint_address,
        view.account_address,
        view.quantity.normalize(),
        price,
        format_price(view.total_value()),
        chart_link(&view.mint_address),
        swap_link(&view.mint_address),
    )
}

pub fn render_receipt(receipt: &CloseReceipt) -> String {
    format!(
        "Closed {} token accounts (fee {} lamports)\n{}",
        receipt.closed_mints.len(),
        receipt.fee_lamports,
        receipt.explorer_url
    )
}
