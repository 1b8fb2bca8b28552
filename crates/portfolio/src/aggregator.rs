use blockchain::{parse_address, LedgerReader, TokenAccount};
use futures::future::join_all;
use market::{MetadataResolver, PriceOracle};
use shared::models::quantity_from_raw;
use shared::{Result, TokenAccountView};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::book::AccountBook;

/// Result of a discovery pass that reached the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Applied { accounts: usize },
    /// A newer pass was issued while this one was in flight; its results were dropped
    Superseded,
}

/// Sort views for display: total value descending, then quantity ascending.
pub fn sort_views(views: &mut [TokenAccountView]) {
    views.sort_by(|a, b| a.display_order(b));
}

/// Builds the ordered account collection for a wallet from the ledger, the metadata
/// registry and the price source.
pub struct AccountAggregator {
    ledger: Arc<dyn LedgerReader>,
    metadata: Arc<dyn MetadataResolver>,
    prices: Arc<dyn PriceOracle>,
    book: Arc<AccountBook>,
}

impl AccountAggregator {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        metadata: Arc<dyn MetadataResolver>,
        prices: Arc<dyn PriceOracle>,
        book: Arc<AccountBook>,
    ) -> Self {
        Self {
            ledger,
            metadata,
            prices,
            book,
        }
    }

    pub fn book(&self) -> Arc<AccountBook> {
        Arc::clone(&self.book)
    }

    /// Run a full discovery pass for `owner` and publish it to the book.
    ///
    /// Ledger failures fail the pass and leave the book as it was. Enrichment failures only
    /// leave the affected fields unset.
    pub async fn discover(&self, owner: &str) -> Result<PassOutcome> {
        let pass = self.book.begin_pass();
        info!("Discovering token accounts for {} (pass {})", owner, pass.id());

        let owner_key = parse_address(owner).map_err(|e| {
            error!("Discovery pass {} failed: {}", pass.id(), e);
            e
        })?;

        let accounts = self.ledger.token_accounts(&owner_key).await.map_err(|e| {
            error!("Discovery pass {} failed: {}", pass.id(), e);
            e
        })?;

        let mut views = join_all(accounts.iter().map(|account| self.enrich(account))).await;
        sort_views(&mut views);

        let count = views.len();
        if self
            .book
            .apply_pass(pass, owner_key.to_string(), views)
            .await
        {
            Ok(PassOutcome::Applied { accounts: count })
        } else {
            Ok(PassOutcome::Superseded)
        }
    }

    /// Resolve metadata and price for one account concurrently.
    pub async fn enrich(&self, account: &TokenAccount) -> TokenAccountView {
        let (metadata, unit_price) = tokio::join!(
            self.metadata.resolve(&account.mint),
            self.prices.unit_price(&account.mint)
        );

        let metadata = match metadata {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Metadata unavailable for {}: {}", account.mint, e);
                None
            }
        };

        if unit_price.is_none() {
            debug!("No price for {}", account.mint);
        }

        TokenAccountView {
            account_address: account.address.clone(),
            mint_address: account.mint.clone(),
            raw_amount: account.amount,
            quantity: quantity_from_raw(account.amount, account.decimals),
            decimals: account.decimals,
            metadata,
            unit_price,
        }
    }
}
