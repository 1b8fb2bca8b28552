//! External venue links surfaced next to each token and after a close.

const EXPLORER_BASE: &str = "https://explorer.solana.com";
const CHART_BASE: &str = "https://dexscreener.com/solana";
const SWAP_BASE: &str = "https://raydium.io/swap/";
/// USDT mint, the output side of swap links
const SWAP_OUTPUT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

pub fn tx_link(signature: &str) -> String {
    format!("{}/tx/{}", EXPLORER_BASE, signature)
}

pub fn address_link(address: &str) -> String {
    format!("{}/address/{}", EXPLORER_BASE, address)
}

pub fn chart_link(mint: &str) -> String {
    format!("{}/{}", CHART_BASE, mint)
}

pub fn swap_link(mint: &str) -> String {
    format!(
        "{}?inputMint={}&outputMint={}",
        SWAP_BASE, mint, SWAP_OUTPUT_MINT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        assert_eq!(tx_link("abc"), "https://explorer.solana.com/tx/abc");
        assert_eq!(address_link("xyz"), "https://explorer.solana.com/address/xyz");
        assert_eq!(chart_link("M"), "https://dexscreener.com/solana/M");
        assert_eq!(
            swap_link("M"),
            "https://raydium.io/swap/?inputMint=M&outputMint=Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB"
        );
    }
}
