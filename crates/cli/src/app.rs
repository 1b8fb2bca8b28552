use anyhow::{Context, Result};
use blockchain::{parse_commitment, LedgerReader, PollConfig, SolanaClient, TransactionGateway};
use market::{http_client, DexScreenerClient, MetadataResolver, MetaplexResolver, PriceOracle};
use portfolio::{AccountAggregator, AccountBook};
use reclaim::{CloseController, CloseTransactionBuilder, FeeSchedule};
use shared::Config;
use std::sync::Arc;
use tracing::info;

/// Composition root: every client is built once here and shared by handle.
pub struct App {
    pub book: Arc<AccountBook>,
    pub aggregator: AccountAggregator,
    pub controller: CloseController,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let finality = parse_commitment(&config.confirmation.commitment)?;
        let solana =
            Arc::new(SolanaClient::new(config.solana.rpc_url.clone()).with_finality(finality));
        let http = http_client(config.market.http_timeout()).context("HTTP client")?;

        let metadata: Arc<dyn MetadataResolver> =
            Arc::new(MetaplexResolver::new(solana.rpc(), http.clone()));
        let prices: Arc<dyn PriceOracle> = Arc::new(DexScreenerClient::new(
            http,
            config.market.price_api_url.clone(),
        ));
        let ledger: Arc<dyn LedgerReader> = solana.clone();
        let gateway: Arc<dyn TransactionGateway> = solana;

        let book = Arc::new(AccountBook::new());
        let aggregator = AccountAggregator::new(ledger, metadata, prices, Arc::clone(&book));

        let builder = CloseTransactionBuilder::new(FeeSchedule::from(&config.fees));
        let poll = PollConfig::new(
            config.confirmation.poll_interval(),
            config.confirmation.timeout(),
        );
        let controller = CloseController::new(gateway, builder, Arc::clone(&book), poll);

        info!(
            "Reclaimer ready (rpc: {}, fee: {} lamports per account)",
            config.solana.rpc_url, config.fees.amount_lamports
        );

        Ok(Self {
            book,
            aggregator,
            controller,
        })
    }
}
