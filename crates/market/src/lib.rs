pub mod metadata;
pub mod price;

pub use metadata::{MetadataResolver, MetaplexResolver, OnChainMetadata};
pub use price::{average_price, DexScreenerClient, PriceOracle};

use reqwest::Client;
use shared::{Error, Result};
use std::time::Duration;

/// Shared HTTP client for the metadata and price sources.
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("reclaimer/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))
}
