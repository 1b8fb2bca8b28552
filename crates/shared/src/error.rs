use thiserror::Error;

/// Failures raised at the transport and validation boundaries.
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger node unreachable or request refused
    #[error("Ledger RPC failure: {0}")]
    SolanaRpc(String),

    #[error("Malformed owner address: {0}")]
    InvalidWalletAddress(String),

    /// Metadata registry or price source
    #[error("Market data source failure: {0}")]
    ExternalService(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
