//! `WalletBackend` over the `linera` command-line wallet.
//!
//! Every call is `<bin> --wallet <path> <subcommand…>` with `LINERA_WALLET`
//! set to the same path. Calls touching one wallet file are serialized
//! through [`WalletLocks`]; the CLI keeps local state in that file and does
//! not tolerate concurrent writers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chainritual_common::amount::Amount;
use chainritual_common::chain::ChainId;
use chainritual_common::wallet_backend::{
    ChainCredentials, TransferOutcome, WalletBackend, WalletError,
};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::runner::{CommandInvocation, CommandRunner, ProcessRunner};

/// Where and how to invoke the CLI.
#[derive(Clone, Debug)]
pub struct LineraConfig {
    pub bin: String,
    pub wallet_path: PathBuf,
    pub faucet_url: Option<String>,
}

/// Per-wallet-path async mutexes.
#[derive(Clone, Debug, Default)]
pub struct WalletLocks {
    inner: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of the wallet file at `path`.
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.inner.entry(path.to_path_buf()).or_default().value());
        lock.lock_owned().await
    }
}

pub struct LineraCli<R = ProcessRunner> {
    config: LineraConfig,
    runner: R,
    locks: WalletLocks,
}

impl LineraCli<ProcessRunner> {
    pub fn new(config: LineraConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: CommandRunner> LineraCli<R> {
    pub fn with_runner(config: LineraConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            locks: WalletLocks::new(),
        }
    }

    fn invocation(&self) -> CommandInvocation {
        let wallet = self.config.wallet_path.display().to_string();
        CommandInvocation::new(&self.config.bin)
            .arg("--wallet")
            .arg(wallet.clone())
            .env("LINERA_WALLET", wallet)
    }

    fn faucet_url(&self) -> Result<&str, WalletError> {
        self.config
            .faucet_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                WalletError::WalletInit("faucet URL is not configured (set LINERA_FAUCET_URL)".into())
            })
    }

    async fn wallet_file_exists(&self) -> bool {
        tokio::fs::try_exists(&self.config.wallet_path)
            .await
            .unwrap_or(false)
    }

    /// Balance read without taking the wallet lock; callers hold it.
    async fn read_balance(&self, identifier: &str) -> Result<String, WalletError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(WalletError::BalanceQuery("no chain identifier given".into()));
        }
        let output = self
            .runner
            .run(self.invocation().args(["query-balance", identifier]))
            .await
            .map_err(|e| WalletError::BalanceQuery(e.diagnostic()))?;
        if output.trim().is_empty() {
            return Err(WalletError::BalanceQuery(
                "query-balance produced no output".into(),
            ));
        }
        Ok(output)
    }
}

/// Split `wallet request-chain` output into (chain id, account id).
pub fn parse_request_chain(output: &str) -> Result<ChainCredentials, WalletError> {
    let mut tokens = output.split_whitespace();
    let (Some(chain), Some(account)) = (tokens.next(), tokens.next()) else {
        return Err(WalletError::WalletInit(format!(
            "unexpected request-chain output: {output:?}"
        )));
    };
    let chain_id = ChainId::parse(chain)
        .map_err(|e| WalletError::WalletInit(format!("request-chain returned {chain:?}: {e}")))?;
    Ok(ChainCredentials {
        chain_id,
        account_id: account.to_string(),
    })
}

impl<R: CommandRunner> WalletBackend for LineraCli<R> {
    async fn create_wallet(&self) -> Result<ChainCredentials, WalletError> {
        let faucet = self.faucet_url()?.to_string();
        let _guard = self.locks.acquire(&self.config.wallet_path).await;

        if !self.wallet_file_exists().await {
            info!(path = %self.config.wallet_path.display(), "initializing wallet");
            self.runner
                .run(self.invocation().args(["wallet", "init", "--faucet", faucet.as_str()]))
                .await
                .map_err(|e| WalletError::WalletInit(e.diagnostic()))?;
        }

        let output = self
            .runner
            .run(
                self.invocation()
                    .args(["wallet", "request-chain", "--faucet", faucet.as_str()]),
            )
            .await
            .map_err(|e| WalletError::WalletInit(e.diagnostic()))?;

        let credentials = parse_request_chain(&output)?;
        info!(chain = %credentials.chain_id, "chain claimed from faucet");
        Ok(credentials)
    }

    async fn query_balance(&self, identifier: &str) -> Result<String, WalletError> {
        let _guard = self.locks.acquire(&self.config.wallet_path).await;
        self.read_balance(identifier).await
    }

    async fn transfer(
        &self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<TransferOutcome, WalletError> {
        let (amount, from, to) = (amount.trim(), from.trim(), to.trim());
        Amount::parse_positive(amount)
            .map_err(|e| WalletError::TransferFailed(e.to_string()))?;

        let _guard = self.locks.acquire(&self.config.wallet_path).await;
        let result = self
            .runner
            .run(self.invocation().args(["transfer", amount, "--from", from, "--to", to]))
            .await
            .map_err(|e| WalletError::TransferFailed(e.diagnostic()))?;
        info!(%amount, %from, %to, "transfer submitted");

        let balance = self.read_balance(from).await;
        if let Err(e) = &balance {
            warn!(%from, error = %e, "transfer succeeded but balance refresh failed");
        }
        Ok(TransferOutcome { result, balance })
    }

    fn backend_name(&self) -> &str {
        "linera-cli"
    }
}
