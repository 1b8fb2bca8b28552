use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_PRICE_API_URL: &str = "https://api.dexscreener.com/latest/dex/tokens";
pub const DEFAULT_FEE_AMOUNT: u64 = 100_000;
pub const DEFAULT_CONFIRM_COMMITMENT: &str = "finalized";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub solana: SolanaConfig,
    pub fees: FeeConfig,
    pub market: MarketConfig,
    pub confirmation: ConfirmationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    /// Address collecting the per-account service fee. Closing is refused while unset.
    pub receiver: Option<String>,
    /// Lamports charged per closed account
    pub amount_lamports: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    pub price_api_url: String,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
    /// Commitment level a close must reach before the book is updated
    pub commitment: String,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl MarketConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl ConfirmationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset, same as a missing variable.
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Config {
            solana: SolanaConfig {
                rpc_url: var("RPC_ENDPOINT").unwrap_or_else(|| DEFAULT_RPC_ENDPOINT.to_string()),
            },
            fees: FeeConfig {
                receiver: var("FEE_RECEIVER").map(|value| value.trim().to_string()),
                amount_lamports: parse_or("FEE_AMOUNT", var("FEE_AMOUNT"), DEFAULT_FEE_AMOUNT)?,
            },
            market: MarketConfig {
                price_api_url: var("PRICE_API_URL")
                    .unwrap_or_else(|| DEFAULT_PRICE_API_URL.to_string()),
                http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", var("HTTP_TIMEOUT_SECS"), 10)?,
            },
            confirmation: ConfirmationConfig {
                commitment: var("CONFIRM_COMMITMENT")
                    .map(|value| value.trim().to_lowercase())
                    .unwrap_or_else(|| DEFAULT_CONFIRM_COMMITMENT.to_string()),
                poll_interval_ms: parse_or(
                    "CONFIRM_POLL_INTERVAL_MS",
                    var("CONFIRM_POLL_INTERVAL_MS"),
                    500,
                )?,
                timeout_secs: parse_or("CONFIRM_TIMEOUT_SECS", var("CONFIRM_TIMEOUT_SECS"), 90)?,
            },
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
