//! `chainritual` command line wallet.

use anyhow::Context;
use chainritual_client::config::{ClientArgs, ClientConfig};
use chainritual_client::market::{self, MarketForm};
use chainritual_client::price::{PriceFeed, PriceQuote, POLL_INTERVAL};
use chainritual_client::transfer_form::TransferForm;
use chainritual_client::{FileStore, HttpGateway, WalletSession};
use chainritual_common::market::Side;
use chainritual_common::wallet::Wallet;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chainritual", version, about = "ChainRitual wallet client")]
struct Cli {
    #[command(flatten)]
    args: ClientArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Claim a new chain from the faucet and save it as the wallet
    Create,
    /// Print the saved wallet
    Show,
    /// Fetch the current balance from the gateway
    Refresh,
    /// Send tokens to another chain
    Transfer {
        /// Recipient chain id
        #[arg(long)]
        to: String,

        /// Amount to send
        #[arg(long, required_unless_present = "max", conflicts_with = "max")]
        amount: Option<String>,

        /// Send the whole cached balance
        #[arg(long)]
        max: bool,
    },
    /// Forget the saved wallet
    Clear,
    /// Print the wallet record as JSON
    Backup,
    /// List past transfers
    History,
    /// Show the BTC/USD price
    Price {
        /// Keep polling until interrupted
        #[arg(long)]
        watch: bool,
    },
    /// Open a BTC up/down bet
    Bet {
        /// UP or DOWN
        #[arg(long)]
        side: Side,

        /// Amount to stake
        #[arg(long)]
        amount: String,
    },
}

fn print_wallet(wallet: &Wallet) {
    println!("chain:   {}", wallet.chain_id());
    println!("account: {}", wallet.account_id());
    println!("balance: {}", wallet.balance());
}

fn print_quote(quote: &PriceQuote) {
    match quote {
        PriceQuote::Live(p) => println!("BTC/USD {p}"),
        PriceQuote::Cached(p) => println!("BTC/USD {p} (cached)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from(cli.args);
    let store = FileStore::new(config.store_dir.clone());
    let gateway = HttpGateway::new(config.endpoints.clone());
    let mut session = WalletSession::open(store, gateway)
        .with_context(|| format!("failed to open wallet store at {}", config.store_dir.display()))?;

    match cli.command {
        Command::Create => {
            let wallet = session.create_wallet().await?;
            print_wallet(wallet);
        }
        Command::Show => match session.wallet() {
            Some(wallet) => print_wallet(wallet),
            None => println!("no wallet; run `chainritual create`"),
        },
        Command::Refresh => {
            let wallet = session.refresh_balance().await?;
            print_wallet(wallet);
        }
        Command::Transfer { to, amount, max } => {
            let mut form = TransferForm::new(to, amount.unwrap_or_default());
            if max {
                let balance = session
                    .wallet()
                    .map(|w| w.balance().to_string())
                    .unwrap_or_default();
                form.fill_max(&balance)?;
            }
            let receipt = session.transfer(&form).await?;
            println!("{}", receipt.result);
            println!("balance: {}", receipt.balance);
            if let Some(warning) = receipt.balance_warning {
                eprintln!("warning: balance not refreshed: {warning}");
            }
            if let Some(warning) = receipt.store_warning {
                eprintln!("warning: {warning}");
            }
        }
        Command::Clear => {
            session.clear()?;
            println!("wallet cleared");
        }
        Command::Backup => println!("{}", session.backup_json()?),
        Command::History => {
            if session.history().is_empty() {
                println!("no transfers yet");
            }
            for entry in session.history() {
                println!(
                    "{}  {} -> {}  {}",
                    entry.time.format("%Y-%m-%d %H:%M:%S"),
                    entry.from,
                    entry.to,
                    entry.amount
                );
            }
        }
        Command::Price { watch } => {
            let feed = PriceFeed::new(config.price_url.clone())?;
            if !watch {
                print_quote(&feed.latest(session.store()).await?);
                return Ok(());
            }
            loop {
                match feed.latest(session.store()).await {
                    Ok(quote) => print_quote(&quote),
                    Err(e) => warn!(error = %e, "no price available"),
                }
                tokio::select! {
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Bet { side, amount } => {
            let feed = PriceFeed::new(config.price_url.clone())?;
            let quote = feed.latest(session.store()).await?;
            let ticket = MarketForm::new(Some(side), amount).prepare(
                session.wallet(),
                quote.price(),
                Utc::now(),
            )?;
            println!(
                "{} {} at {} (round ends {})",
                ticket.side,
                ticket.amount,
                ticket.entry_price,
                ticket.expires_at.format("%H:%M:%S")
            );
            market::place_bet(&ticket, Utc::now())?;
        }
    }
    Ok(())
}
