use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;

/// Parsed SPL token account as reported by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub address: String,
    pub mint: String,
    pub owner: String,
    /// Raw integer amount, unscaled
    pub amount: u64,
    pub decimals: u8,
}

/// Freshness token attached to a transaction before signing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    /// Last block height at which a transaction using `blockhash` can land
    pub last_valid_block_height: u64,
}

/// Status of a submitted signature, reduced to what confirmation needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureStatus {
    /// Unknown to the node or not yet at the required commitment
    Pending,
    Confirmed,
    /// Landed but failed on chain
    Reverted(String),
}
