use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Error, Result};
use std::str::FromStr;
use tracing::{debug, warn};

/// Current unit price of a mint in the reference currency.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// `None` when the source is unreachable or lists no usable pair.
    async fn unit_price(&self, mint: &str) -> Option<Decimal>;
}

// DexScreener API response structures
#[derive(Debug, Deserialize)]
pub struct PairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<TradingPair>>,
}

#[derive(Debug, Deserialize)]
pub struct TradingPair {
    #[serde(rename = "baseToken")]
    pub base_token: PairToken,
    #[serde(rename = "priceUsd", default)]
    pub price_usd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PairToken {
    pub address: String,
}

/// Arithmetic mean of the quoted prices of pairs whose base token is `mint`.
///
/// Pairs quoting against `mint` as the quote side, or lacking a parsable price, do not count.
/// Zero matching pairs yields `None`.
pub fn average_price(pairs: &[TradingPair], mint: &str) -> Option<Decimal> {
    let prices: Vec<Decimal> = pairs
        .iter()
        .filter(|pair| pair.base_token.address == mint)
        .filter_map(|pair| pair.price_usd.as_deref())
        .filter_map(|price| Decimal::from_str(price.trim()).ok())
        .collect();

    if prices.is_empty() {
        return None;
    }

    let total = prices
        .iter()
        .try_fold(Decimal::ZERO, |acc, price| acc.checked_add(*price))?;
    total.checked_div(Decimal::from(prices.len()))
}

/// Price oracle backed by the DexScreener token pairs endpoint
pub struct DexScreenerClient {
    http: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(http: Client, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every trading pair the source lists for `mint`.
    pub async fn fetch_pairs(&self, mint: &str) -> Result<Vec<TradingPair>> {
        let url = format!("{}/{}", self.base_url, mint);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::ExternalService(format!("Failed to send price request: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ExternalService(format!(
                "Price API returned error status: {}",
                response.status()
            )));
        }

        let body: PairsResponse = response
            .json()
            .await
            .map_err(|e| Error::ExternalService(format!("Failed to parse price response: {}", e)))?;

        Ok(body.pairs.unwrap_or_default())
    }
}

#[async_trait]
impl PriceOracle for DexScreenerClient {
    async fn unit_price(&self, mint: &str) -> Option<Decimal> {
        let pairs = match self.fetch_pairs(mint).await {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Price lookup failed for {}: {}", mint, e);
                return None;
            }
        };

        let price = average_price(&pairs, mint);
        debug!(
            "Resolved price for {} from {} pairs: {:?}",
            mint,
            pairs.len(),
            price
        );
        price
    }
}
