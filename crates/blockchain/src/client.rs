use anyhow::Context;
use async_trait::async_trait;
use shared::{Error, Result};
use solana_account_decoder::UiAccountData;
use solana_client::{
    nonblocking::rpc_client::RpcClient, rpc_request::TokenAccountsFilter,
    rpc_response::RpcKeyedAccount,
};
use solana_sdk::{
    commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::gateway::{LedgerReader, TransactionGateway};
use crate::types::{BlockhashInfo, SignatureStatus, TokenAccount};

/// Parse a base58 wallet or account address.
pub fn parse_address(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address.trim()).map_err(|e| {
        warn!("Invalid wallet address format: {} - {}", address, e);
        Error::InvalidWalletAddress(format!("Invalid Solana address format: {}", e))
    })
}

/// Parse a commitment level name (`processed`, `confirmed` or `finalized`).
pub fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match CommitmentConfig::from_str(level.trim()) {
        Ok(commitment)
            if commitment.is_finalized()
                || commitment.is_confirmed()
                || commitment == CommitmentConfig::processed() =>
        {
            Ok(commitment)
        }
        _ => Err(Error::Config(format!("Unknown commitment level '{}'", level))),
    }
}

/// Solana client wrapper for ledger reads and transaction submission
pub struct SolanaClient {
    rpc: Arc<RpcClient>,
    commitment: CommitmentConfig,
    /// Level a signature must reach to count as confirmed
    finality: CommitmentConfig,
}

impl SolanaClient {
    /// Create a new Solana client at `confirmed` commitment
    pub fn new(rpc_url: String) -> Self {
        Self::new_with_commitment(rpc_url, CommitmentConfig::confirmed())
    }

    pub fn new_with_commitment(rpc_url: String, commitment: CommitmentConfig) -> Self {
        info!("Initializing Solana client with RPC: {}", rpc_url);

        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(rpc_url, commitment)),
            commitment,
            finality: commitment,
        }
    }

    /// Require signatures to reach `finality` before they count as confirmed.
    ///
    /// Reads and blockhashes stay at the client commitment.
    pub fn with_finality(mut self, finality: CommitmentConfig) -> Self {
        info!("Waiting for {:?} commitment on submitted transactions", finality.commitment);
        self.finality = finality;
        self
    }

    /// Shared handle to the underlying RPC client, for collaborators reading other accounts
    pub fn rpc(&self) -> Arc<RpcClient> {
        Arc::clone(&self.rpc)
    }

    /// Get all SPL token accounts for a wallet address
    pub async fn get_token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>> {
        debug!("Fetching token accounts for address: {}", owner);

        let accounts = self
            .rpc
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await
            .map_err(|e| Error::SolanaRpc(format!("Failed to fetch token accounts: {}", e)))?;

        let mut token_accounts = Vec::with_capacity(accounts.len());
        for account in &accounts {
            match parse_keyed_account(owner, account) {
                Ok(token_account) => token_accounts.push(token_account),
                Err(e) => {
                    warn!("Failed to parse token account {}: {:#}", account.pubkey, e);
                    continue;
                }
            }
        }

        debug!("Retrieved {} token accounts", token_accounts.len());
        Ok(token_accounts)
    }
}

fn parse_keyed_account(owner: &Pubkey, account: &RpcKeyedAccount) -> anyhow::Result<TokenAccount> {
    match &account.account.data {
        UiAccountData::Json(parsed_account) => {
            parse_token_account(&account.pubkey, owner, &parsed_account.parsed)
        }
        _ => Err(anyhow::anyhow!("Expected JSON parsed account data")),
    }
}

/// Parse the `jsonParsed` layout of an SPL token account.
pub fn parse_token_account(
    address: &str,
    owner: &Pubkey,
    parsed: &serde_json::Value,
) -> anyhow::Result<TokenAccount> {
    let info = parsed
        .get("info")
        .ok_or_else(|| anyhow::anyhow!("Missing info field"))?;

    let mint = info
        .get("mint")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing mint field"))?
        .to_string();

    let token_amount = info
        .get("tokenAmount")
        .ok_or_else(|| anyhow::anyhow!("Missing tokenAmount field"))?;

    let amount = token_amount
        .get("amount")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing amount field"))?
        .parse::<u64>()
        .context("Failed to parse amount")?;

    let decimals = token_amount
        .get("decimals")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| anyhow::anyhow!("Missing decimals field"))?;
    let decimals = u8::try_from(decimals).context("Decimals out of range")?;

    Ok(TokenAccount {
        address: address.to_string(),
        mint,
        owner: owner.to_string(),
        amount,
        decimals,
    })
}

#[async_trait]
impl LedgerReader for SolanaClient {
    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>> {
        self.get_token_accounts(owner).await
    }
}

#[async_trait]
impl TransactionGateway for SolanaClient {
    async fn latest_blockhash(&self) -> Result<BlockhashInfo> {
        let (blockhash, last_valid_block_height) = self
            .rpc
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| Error::SolanaRpc(format!("Failed to get blockhash: {}", e)))?;

        debug!(
            "Latest blockhash {} valid through height {}",
            blockhash, last_valid_block_height
        );
        Ok(BlockhashInfo {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.rpc
            .send_transaction(transaction)
            .await
            .map_err(|e| Error::SolanaRpc(format!("Transaction rejected: {}", e)))
    }

    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus> {
        let response = self
            .rpc
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| Error::SolanaRpc(format!("Failed to get signature status: {}", e)))?;

        let status = match response.value.into_iter().next().flatten() {
            None => SignatureStatus::Pending,
            Some(status) => match status.err {
                Some(err) => SignatureStatus::Reverted(err.to_string()),
                None if status.satisfies_commitment(self.finality) => SignatureStatus::Confirmed,
                None => SignatureStatus::Pending,
            },
        };
        Ok(status)
    }

    async fn block_height(&self) -> Result<u64> {
        self.rpc
            .get_block_height()
            .await
            .map_err(|e| Error::SolanaRpc(format!("Failed to get block height: {}", e)))
    }
}
