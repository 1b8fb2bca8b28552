use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair},
    signer::Signer,
    transaction::Transaction,
};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The holder refused to sign
    #[error("Signing rejected: {0}")]
    Rejected(String),

    #[error("Signing failed: {0}")]
    Failed(String),
}

/// Connected wallet able to sign on behalf of the account owner.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Sign `transaction` against its current recent blockhash.
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, SignerError>;
}

/// Signer holding a local keypair
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Load a keypair from a JSON keypair file (as written by `solana-keygen`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let path = path.as_ref();
        let keypair = read_keypair_file(path).map_err(|e| {
            SignerError::Failed(format!("Failed to read keypair {}: {}", path.display(), e))
        })?;
        Ok(Self::new(keypair))
    }
}

#[async_trait]
impl WalletSigner for KeypairSigner {
    fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[&self.keypair], blockhash)
            .map_err(|e| SignerError::Failed(e.to_string()))?;

        debug!("Signed transaction with {}", self.keypair.pubkey());
        Ok(transaction)
    }
}
