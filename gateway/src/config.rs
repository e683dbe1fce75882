use std::path::PathBuf;

use clap::Parser;

use crate::linera::LineraConfig;

/// Command line and environment for the gateway. Every flag falls back to
/// an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "chainritual-gateway", about = "HTTP gateway to the linera wallet CLI")]
pub struct GatewayArgs {
    /// Address to bind.
    #[arg(long, env = "CHAINRITUAL_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// HTTP port to listen on.
    #[arg(long, env = "CHAINRITUAL_PORT", default_value_t = 3000)]
    pub port: u16,

    /// `linera` executable.
    #[arg(long, env = "LINERA_BIN", default_value = "linera")]
    pub linera_bin: String,

    /// Wallet storage file used by every CLI call.
    #[arg(long, env = "LINERA_WALLET", default_value = "/root/.linera/wallet.json")]
    pub wallet: PathBuf,

    /// Faucet used to initialize wallets and claim chains.
    #[arg(long, env = "LINERA_FAUCET_URL")]
    pub faucet_url: Option<String>,

    /// Genesis hash of the network, echoed with balances.
    #[arg(long, env = "CHAINRITUAL_GENESIS_HASH")]
    pub genesis_hash: Option<String>,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub listen_addr: String,
    pub linera: LineraConfig,
    pub genesis_hash: Option<String>,
}

impl GatewayConfig {
    pub fn faucet_configured(&self) -> bool {
        self.linera
            .faucet_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

impl From<GatewayArgs> for GatewayConfig {
    fn from(args: GatewayArgs) -> Self {
        let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            listen_addr: format!("{}:{}", args.bind, args.port),
            linera: LineraConfig {
                bin: args.linera_bin,
                wallet_path: args.wallet,
                faucet_url: blank_to_none(args.faucet_url),
            },
            genesis_hash: blank_to_none(args.genesis_hash),
        }
    }
}
