use blockchain::{await_confirmation, ConfirmationOutcome, PollConfig, TransactionGateway};
use chrono::{DateTime, Utc};
use portfolio::AccountBook;
use shared::links::tx_link;
use shared::TokenAccountView;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::builder::{CloseRequest, CloseTransactionBuilder};
use crate::error::{CloseError, FailureReason};
use crate::signer::{SignerError, WalletSigner};

/// Lifecycle of one close attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    Idle,
    Building,
    AwaitingSignature,
    Submitted,
    Confirming,
    Succeeded,
    Failed,
}

impl CloseState {
    /// Whether a request currently owns the controller
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            CloseState::Building
                | CloseState::AwaitingSignature
                | CloseState::Submitted
                | CloseState::Confirming
        )
    }
}

/// Outcome of a confirmed close
#[derive(Debug, Clone)]
pub struct CloseReceipt {
    pub signature: Signature,
    /// Sorted
    pub closed_mints: Vec<String>,
    pub fee_lamports: u64,
    pub explorer_url: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Signs, submits and confirms close transactions, one at a time.
///
/// The account book is only touched after confirmation.
pub struct CloseController {
    gateway: Arc<dyn TransactionGateway>,
    builder: CloseTransactionBuilder,
    book: Arc<AccountBook>,
    poll: PollConfig,
    state: RwLock<CloseState>,
}

impl CloseController {
    pub fn new(
        gateway: Arc<dyn TransactionGateway>,
        builder: CloseTransactionBuilder,
        book: Arc<AccountBook>,
        poll: PollConfig,
    ) -> Self {
        Self {
            gateway,
            builder,
            book,
            poll,
            state: RwLock::new(CloseState::Idle),
        }
    }

    pub async fn state(&self) -> CloseState {
        *self.state.read().await
    }

    /// Return a finished controller to `Idle`. No effect while a request is in flight.
    pub async fn acknowledge(&self) {
        let mut state = self.state.write().await;
        if !state.is_in_flight() {
            *state = CloseState::Idle;
        }
    }

    /// Close every selected account in one transaction.
    pub async fn close_selected(
        &self,
        signer: Option<&dyn WalletSigner>,
    ) -> Result<CloseReceipt, CloseError> {
        self.claim().await?;
        let items = self.book.selection().await;
        self.finish(self.execute(signer, &items).await).await
    }

    /// Close a single account through the same path.
    pub async fn close_one(
        &self,
        signer: Option<&dyn WalletSigner>,
        item: &TokenAccountView,
    ) -> Result<CloseReceipt, CloseError> {
        self.claim().await?;
        self.finish(self.execute(signer, std::slice::from_ref(item)).await)
            .await
    }

    async fn claim(&self) -> Result<(), CloseError> {
        let mut state = self.state.write().await;
        if state.is_in_flight() {
            warn!("Rejecting close request while in {:?}", *state);
            return Err(CloseError::Busy);
        }
        *state = CloseState::Building;
        Ok(())
    }

    async fn transition(&self, next: CloseState) {
        let mut state = self.state.write().await;
        info!("Close request {:?} -> {:?}", *state, next);
        *state = next;
    }

    async fn finish(
        &self,
        result: Result<CloseReceipt, CloseError>,
    ) -> Result<CloseReceipt, CloseError> {
        match &result {
            Ok(receipt) => {
                info!(
                    "Closed {} accounts in {}",
                    receipt.closed_mints.len(),
                    receipt.signature
                );
                self.transition(CloseState::Succeeded).await;
            }
            Err(CloseError::Failed(reason)) => {
                error!("Close request failed: {}", reason);
                self.transition(CloseState::Failed).await;
            }
            Err(e) => {
                warn!("Close request refused: {}", e);
                self.transition(CloseState::Idle).await;
            }
        }
        result
    }

    async fn execute(
        &self,
        signer: Option<&dyn WalletSigner>,
        items: &[TokenAccountView],
    ) -> Result<CloseReceipt, CloseError> {
        let owner = signer.map(|signer| signer.pubkey());

        if let (Some(signer_key), Some(book_owner)) = (owner, self.book.owner().await) {
            if signer_key.to_string() != book_owner {
                return Err(CloseError::SignerMismatch {
                    signer: signer_key.to_string(),
                    owner: book_owner,
                });
            }
        }

        let CloseRequest {
            mut transaction,
            closed_mints,
            fee_lamports,
            account_count,
            ..
        } = self.builder.build(owner, items)?;
        let signer = signer.ok_or(CloseError::NoSigner)?;

        let blockhash = self
            .gateway
            .latest_blockhash()
            .await
            .map_err(|e| FailureReason::BlockhashUnavailable(e.to_string()))?;
        transaction.message.recent_blockhash = blockhash.blockhash;

        self.transition(CloseState::AwaitingSignature).await;
        let signed = signer
            .sign_transaction(transaction)
            .await
            .map_err(|e| match e {
                SignerError::Rejected(reason) | SignerError::Failed(reason) => {
                    FailureReason::SignatureDenied(reason)
                }
            })?;
        if !signed.is_signed() {
            return Err(FailureReason::SignatureDenied(
                "wallet returned an unsigned transaction".to_string(),
            )
            .into());
        }

        self.transition(CloseState::Submitted).await;
        let signature = self
            .gateway
            .send_transaction(&signed)
            .await
            .map_err(|e| FailureReason::SubmissionRejected(e.to_string()))?;
        info!(
            "Submitted close of {} accounts as {}",
            account_count, signature
        );

        self.transition(CloseState::Confirming).await;
        match await_confirmation(
            self.gateway.as_ref(),
            &signature,
            blockhash.last_valid_block_height,
            &self.poll,
        )
        .await
        {
            ConfirmationOutcome::Confirmed => {}
            ConfirmationOutcome::Reverted(reason) => {
                return Err(FailureReason::TransactionReverted(reason).into())
            }
            ConfirmationOutcome::Expired | ConfirmationOutcome::TimedOut => {
                return Err(FailureReason::ConfirmationTimeout.into())
            }
        }

        self.book.remove_closed(&closed_mints).await;
        self.book.clear_selection().await;

        let mut closed_mints: Vec<String> = closed_mints.into_iter().collect();
        closed_mints.sort();

        Ok(CloseReceipt {
            explorer_url: tx_link(&signature.to_string()),
            signature,
            closed_mints,
            fee_lamports,
            confirmed_at: Utc::now(),
        })
    }
}
