use std::path::PathBuf;

use clap::Args;

use crate::price::DEFAULT_PRICE_URL;
use crate::store::FileStore;

/// Gateway route URLs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub wallet: String,
    pub balance: String,
    pub transfer: String,
}

impl Endpoints {
    /// Standard route layout under one gateway base URL.
    pub fn from_base(base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        Self {
            wallet: format!("{base}/wallet"),
            balance: format!("{base}/balance"),
            transfer: format!("{base}/transfer"),
        }
    }
}

/// Connection flags shared by every CLI command.
#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the ChainRitual gateway.
    #[arg(long, env = "CHAINRITUAL_GATEWAY_URL", default_value = "http://localhost:3000")]
    pub gateway: String,

    /// Override for the wallet-creation endpoint.
    #[arg(long, env = "CHAINRITUAL_WALLET_API")]
    pub wallet_api: Option<String>,

    /// Override for the balance endpoint.
    #[arg(long, env = "CHAINRITUAL_BALANCE_API")]
    pub balance_api: Option<String>,

    /// Override for the transfer endpoint.
    #[arg(long, env = "CHAINRITUAL_TRANSFER_API")]
    pub transfer_api: Option<String>,

    /// BTC/USD price endpoint.
    #[arg(long, env = "CHAINRITUAL_PRICE_URL", default_value = DEFAULT_PRICE_URL)]
    pub price_url: String,

    /// Directory holding the persisted wallet.
    #[arg(long, env = "CHAINRITUAL_STORE_DIR")]
    pub store_dir: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    pub price_url: String,
    pub store_dir: PathBuf,
}

impl From<ClientArgs> for ClientConfig {
    fn from(args: ClientArgs) -> Self {
        let mut endpoints = Endpoints::from_base(&args.gateway);
        if let Some(url) = args.wallet_api {
            endpoints.wallet = url;
        }
        if let Some(url) = args.balance_api {
            endpoints.balance = url;
        }
        if let Some(url) = args.transfer_api {
            endpoints.transfer = url;
        }
        Self {
            endpoints,
            price_url: args.price_url,
            store_dir: args.store_dir.unwrap_or_else(FileStore::default_dir),
        }
    }
}
