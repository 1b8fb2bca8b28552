pub mod client;
pub mod gateway;
pub mod poll;
pub mod types;

pub use client::{parse_address, parse_commitment, parse_token_account, SolanaClient};
pub use gateway::{LedgerReader, TransactionGateway};
pub use poll::{await_confirmation, ConfirmationOutcome, PollConfig};
pub use types::*;
