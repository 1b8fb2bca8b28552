mod app;
mod logging;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use portfolio::PassOutcome;
use reclaim::{KeypairSigner, WalletSigner};
use shared::Config;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app::App;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inventory SPL token accounts and reclaim their rent", long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Ledger node URL, overriding RPC_ENDPOINT
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List token accounts of a wallet, most valuable first
    List {
        /// Wallet address
        #[arg(long)]
        owner: String,
    },
    /// Burn and close token accounts, paying the service fee
    Close {
        /// Keypair file of the owning wallet
        #[arg(long)]
        keypair: PathBuf,

        /// Mint to close (repeatable)
        #[arg(long = "mint")]
        mints: Vec<String>,

        /// Also select every account with a zero balance
        #[arg(long)]
        empty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.json_logs)?;

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(rpc_url) = cli.rpc_url {
        config.solana.rpc_url = rpc_url;
    }
    let app = App::new(&config)?;

    match cli.command {
        Command::List { owner } => list(&app, &owner).await,
        Command::Close {
            keypair,
            mints,
            empty,
        } => close(&app, &keypair, &mints, empty).await,
    }
}

async fn discover(app: &App, owner: &str) -> Result<()> {
    match app.aggregator.discover(owner).await? {
        PassOutcome::Applied { accounts } => {
            info!("Found {} token accounts for {}", accounts, owner);
            Ok(())
        }
        PassOutcome::Superseded => bail!("Discovery for {} was superseded", owner),
    }
}

async fn list(app: &App, owner: &str) -> Result<()> {
    discover(app, owner).await?;

    let views = app.book.views().await;
    if views.is_empty() {
        println!("No token accounts found for {}", owner);
        return Ok(());
    }

    for (position, view) in views.iter().enumerate() {
        println!("{}", output::render_view(position + 1, view, false));
    }
    Ok(())
}

async fn close(app: &App, keypair: &Path, mints: &[String], empty: bool) -> Result<()> {
    let signer = KeypairSigner::from_file(keypair)?;
    let owner = signer.pubkey().to_string();
    discover(app, &owner).await?;

    for mint in mints {
        if app.book.is_selected(mint).await {
            continue;
        }
        if !app.book.toggle(mint).await {
            warn!("Mint {} is not held by {}", mint, owner);
        }
    }
    if empty {
        for view in app.book.views().await {
            if !view.has_balance() && !app.book.is_selected(&view.mint_address).await {
                app.book.toggle(&view.mint_address).await;
            }
        }
    }

    let selection = app.book.selection().await;
    for (position, view) in selection.iter().enumerate() {
        println!("{}", output::render_view(position + 1, view, true));
    }

    let receipt = app
        .controller
        .close_selected(Some(&signer))
        .await
        .context("Failed to close token accounts")?;
    println!("{}", output::render_receipt(&receipt));
    Ok(())
}
