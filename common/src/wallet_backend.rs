use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// Identity of a freshly created wallet chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainCredentials {
    pub chain_id: ChainId,
    pub account_id: String,
}

/// Result of a transfer that went through.
///
/// The follow-up balance read is kept separate: a transfer that succeeded is
/// never reported as failed because the read afterwards did not.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    /// Trimmed output of the transfer command.
    pub result: String,
    /// Sender balance re-read after the transfer.
    pub balance: Result<String, WalletError>,
}

/// Errors from wallet operations. Each variant keeps the backend's raw
/// diagnostic so callers can branch on the kind and still show the text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WalletError {
    #[error("wallet initialization failed: {0}")]
    WalletInit(String),
    #[error("balance query failed: {0}")]
    BalanceQuery(String),
    #[error("transfer failed: {0}")]
    TransferFailed(String),
}

impl WalletError {
    /// The backend's own message, without the kind prefix.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::WalletInit(msg)
            | Self::BalanceQuery(msg)
            | Self::TransferFailed(msg) => msg,
        }
    }
}

/// Abstraction over whatever actually owns the chains: the `linera` CLI in
/// production, a scripted fake in tests.
pub trait WalletBackend: Send + Sync + 'static {
    /// Create (or reuse) the local wallet and claim a new chain from the faucet.
    fn create_wallet(
        &self,
    ) -> impl Future<Output = Result<ChainCredentials, WalletError>> + Send;

    /// Balance of `identifier` (`chain` or `chain:account`) as the backend prints it.
    fn query_balance(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<String, WalletError>> + Send;

    /// Move `amount` from `from` to `to`, then re-read the sender's balance.
    fn transfer(
        &self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> impl Future<Output = Result<TransferOutcome, WalletError>> + Send;

    /// Human-readable backend name (e.g. "linera-cli").
    fn backend_name(&self) -> &str;
}
