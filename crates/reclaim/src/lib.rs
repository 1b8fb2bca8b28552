pub mod builder;
pub mod controller;
pub mod error;
pub mod signer;

pub use builder::{CloseRequest, CloseTransactionBuilder, FeeSchedule};
pub use controller::{CloseController, CloseReceipt, CloseState};
pub use error::{CloseError, FailureReason};
pub use signer::{KeypairSigner, SignerError, WalletSigner};
