use thiserror::Error;

/// Why a close attempt that got past building did not succeed.
///
/// None of these mutate the account book; the same selection can be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("could not obtain a recent blockhash: {0}")]
    BlockhashUnavailable(String),

    #[error("signature denied: {0}")]
    SignatureDenied(String),

    #[error("submission rejected: {0}")]
    SubmissionRejected(String),

    #[error("transaction was not confirmed before its blockhash expired")]
    ConfirmationTimeout,

    #[error("transaction failed on chain: {0}")]
    TransactionReverted(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    #[error("No wallet connected")]
    NoSigner,

    #[error("Connected wallet {signer} does not own the listed accounts ({owner})")]
    SignerMismatch { signer: String, owner: String },

    #[error("Fee receiver is not configured")]
    FeeReceiverUnset,

    #[error("Invalid fee receiver address: {0}")]
    InvalidFeeReceiver(String),

    #[error("No token accounts selected")]
    EmptySelection,

    #[error("Invalid token account: {0}")]
    InvalidAccount(String),

    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    #[error("Closing {accounts} accounts needs {size} bytes, over the {limit} byte transaction limit")]
    TransactionTooLarge {
        accounts: usize,
        size: usize,
        limit: usize,
    },

    #[error("Failed to encode transaction: {0}")]
    Encoding(String),

    #[error("A close request is already in progress")]
    Busy,

    #[error("Close failed: {0}")]
    Failed(#[from] FailureReason),
}
