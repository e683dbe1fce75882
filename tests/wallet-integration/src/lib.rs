//! Harness for end-to-end wallet tests: a scripted [`WalletBackend`] and an
//! in-process gateway on an ephemeral port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use chainritual_common::chain::ChainId;
use chainritual_common::wallet_backend::{
    ChainCredentials, TransferOutcome, WalletBackend, WalletError,
};
use chainritual_gateway::{router, AppState};

/// Chain handed out by [`ScriptedBackend::create_wallet`].
pub const TEST_CHAIN: &str = "e476187f6ddfeb9d588c7b45d3df334d5501d6499b3f9ad5595cae86cce16a65";
/// A second valid chain, used as transfer recipient.
pub const PEER_CHAIN: &str = "aa11bb22cc33dd44ee55ff6600112233445566778899aabbccddeeff00112233";

/// What the scripted backend answers. Tests flip fields between steps.
#[derive(Clone, Debug)]
pub struct Script {
    pub balance: String,
    pub create_error: Option<String>,
    pub balance_error: Option<String>,
    pub transfer_error: Option<String>,
    /// Balance reported after the next transfer.
    pub balance_after_transfer: Option<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            balance: "950.".into(),
            create_error: None,
            balance_error: None,
            transfer_error: None,
            balance_after_transfer: None,
        }
    }
}

/// A backend that never touches a real chain and counts its calls.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    calls: AtomicUsize,
    transfers: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedBackend {
    pub fn script(&self, edit: impl FnOnce(&mut Script)) {
        edit(&mut self.script.lock().unwrap());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(amount, from, to)` of every transfer that reached the backend.
    pub fn transfers(&self) -> Vec<(String, String, String)> {
        self.transfers.lock().unwrap().clone()
    }

    fn current(&self) -> Script {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().clone()
    }
}

impl WalletBackend for ScriptedBackend {
    async fn create_wallet(&self) -> Result<ChainCredentials, WalletError> {
        if let Some(msg) = self.current().create_error {
            return Err(WalletError::WalletInit(msg));
        }
        let chain_id = ChainId::parse(TEST_CHAIN)
            .map_err(|e| WalletError::WalletInit(e.to_string()))?;
        Ok(ChainCredentials {
            chain_id,
            account_id: "0x5f1c6e0aa8d2".into(),
        })
    }

    async fn query_balance(&self, _identifier: &str) -> Result<String, WalletError> {
        let script = self.current();
        match script.balance_error {
            Some(msg) => Err(WalletError::BalanceQuery(msg)),
            None => Ok(script.balance),
        }
    }

    async fn transfer(
        &self,
        amount: &str,
        from: &str,
        to: &str,
    ) -> Result<TransferOutcome, WalletError> {
        let script = self.current();
        if let Some(msg) = script.transfer_error {
            return Err(WalletError::TransferFailed(msg));
        }
        self.transfers
            .lock()
            .unwrap()
            .push((amount.into(), from.into(), to.into()));

        let balance = match (script.balance_error, script.balance_after_transfer) {
            (Some(msg), _) => Err(WalletError::BalanceQuery(msg)),
            (None, Some(after)) => {
                self.script.lock().unwrap().balance = after.clone();
                Ok(after)
            }
            (None, None) => Ok(script.balance),
        };
        Ok(TransferOutcome {
            result: format!("transferred {amount} to {to}"),
            balance,
        })
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}

/// Serve `app` on 127.0.0.1 with an OS-assigned port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Run the gateway router over `state`.
pub async fn spawn_gateway<B: WalletBackend>(state: Arc<AppState<B>>) -> String {
    serve(router(state)).await
}
