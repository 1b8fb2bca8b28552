use async_trait::async_trait;
use shared::Result;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::types::{BlockhashInfo, SignatureStatus, TokenAccount};

/// Read side of the ledger: token accounts attributed to an owner.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// All token accounts owned by `owner` under the SPL token program.
    ///
    /// Failures are propagated as-is; implementations do not retry.
    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>>;
}

/// Write side of the ledger: blockhashes, submission and status polling.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    async fn latest_blockhash(&self) -> Result<BlockhashInfo>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    async fn signature_status(&self, signature: &Signature) -> Result<SignatureStatus>;

    async fn block_height(&self) -> Result<u64>;
}
