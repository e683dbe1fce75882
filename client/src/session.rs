//! The client's wallet session.
//!
//! A session holds at most one wallet record. It is loaded from the store
//! when the session opens and saved back after every change. Balances always
//! come from the gateway; nothing here does arithmetic on them.

use chainritual_common::chain::{ChainId, ChainIdError};
use chainritual_common::wallet::{push_capped, ActivityEntry, ActivityKind, Wallet};
use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ApiError, GatewayApi};
use crate::store::{StoreError, WalletStore, HISTORY_SLOT, WALLET_SLOT};
use crate::transfer_form::{TransferForm, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    NoWallet,
    Creating,
    HasWallet,
    Refreshing,
    Transferring,
    Clearing,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet yet, create one first")]
    NoWallet,
    #[error("a wallet already exists, clear it first")]
    WalletExists,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("gateway returned an invalid chain id: {0}")]
    InvalidWallet(#[from] ChainIdError),
    #[error("chain is no longer active on this network; the wallet was cleared")]
    ChainInactive,
}

/// What the user sees after a transfer went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub result: String,
    /// Balance now shown for the wallet.
    pub balance: String,
    /// Set when the gateway could not re-read the balance, in which case
    /// `balance` is the previous value.
    pub balance_warning: Option<String>,
    /// Set when the outcome could not be saved locally. The transfer itself
    /// still went through.
    pub store_warning: Option<String>,
}

pub struct WalletSession<S, G> {
    store: S,
    gateway: G,
    phase: SessionPhase,
    wallet: Option<Wallet>,
    history: Vec<ActivityEntry>,
}

impl<S: WalletStore, G: GatewayApi> WalletSession<S, G> {
    /// Load whatever the store holds. Unreadable records are dropped.
    pub fn open(store: S, gateway: G) -> Result<Self, SessionError> {
        let wallet = match store.get(WALLET_SLOT)? {
            Some(text) => match serde_json::from_str::<Wallet>(&text) {
                Ok(wallet) => Some(wallet),
                Err(e) => {
                    warn!(error = %e, "discarding malformed stored wallet");
                    store.remove(WALLET_SLOT)?;
                    None
                }
            },
            None => None,
        };
        let history = match store.get(HISTORY_SLOT)? {
            Some(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(error = %e, "discarding malformed activity history");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let phase = if wallet.is_some() {
            SessionPhase::HasWallet
        } else {
            SessionPhase::NoWallet
        };
        Ok(Self {
            store,
            gateway,
            phase,
            wallet,
            history,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    /// Past transfers, oldest first.
    pub fn history(&self) -> &[ActivityEntry] {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn create_wallet(&mut self) -> Result<&Wallet, SessionError> {
        if self.wallet.is_some() {
            return Err(SessionError::WalletExists);
        }
        self.phase = SessionPhase::Creating;
        let reply = self.gateway.create_wallet().await;
        self.settle();
        let reply = reply?;

        let chain_id = ChainId::parse(&reply.chain_id)?;
        let wallet = Wallet::new(chain_id, reply.account_id, reply.balance);
        info!(chain_id = %wallet.chain_id(), "wallet created");
        self.replace(wallet)
    }

    /// Re-read the balance. A genesis hash different from the one recorded
    /// with the wallet means the network was reset, so the wallet is
    /// cleared and [`SessionError::ChainInactive`] returned. The check needs
    /// both hashes: a gateway that reports none cannot tell a reset apart
    /// from its own missing configuration, so the wallet is kept.
    pub async fn refresh_balance(&mut self) -> Result<&Wallet, SessionError> {
        let current = self.wallet.clone().ok_or(SessionError::NoWallet)?;
        self.phase = SessionPhase::Refreshing;
        let reply = self.gateway.balance(current.chain_id().as_str()).await;
        self.settle();
        let reply = reply?;

        if let (Some(known), Some(reported)) = (current.genesis_hash(), reply.genesis_hash.as_deref())
        {
            if known != reported {
                warn!(%known, %reported, "genesis hash changed, clearing wallet");
                self.clear()?;
                return Err(SessionError::ChainInactive);
            }
        }

        let mut updated = current.with_balance(reply.balance);
        if current.genesis_hash().is_none() && reply.genesis_hash.is_some() {
            updated = updated.with_genesis_hash(reply.genesis_hash);
        }
        self.replace(updated)
    }

    /// Validate `form`, send it, and record the outcome. Nothing reaches the
    /// gateway unless the form validates.
    pub async fn transfer(&mut self, form: &TransferForm) -> Result<TransferReceipt, SessionError> {
        let current = self.wallet.clone().ok_or(SessionError::NoWallet)?;
        let request = form.validate(&current)?;

        self.phase = SessionPhase::Transferring;
        let reply = self.gateway.transfer(&request).await;
        self.settle();
        let reply = reply?;
        if !reply.success {
            return Err(ApiError::Server {
                status: 200,
                message: reply.result,
            }
            .into());
        }

        let (balance, balance_warning) = match reply.balance {
            Some(balance) => (balance, None),
            None => {
                let warning = reply
                    .balance_error
                    .unwrap_or_else(|| "balance could not be refreshed".to_string());
                warn!(%warning, "transfer sent but balance not refreshed");
                (current.balance().to_string(), Some(warning))
            }
        };

        // The tokens have moved; local save failures only warn from here on.
        let mut store_warning = None;
        if balance_warning.is_none() {
            let updated = self.wallet.insert(current.with_balance(balance.clone()));
            if let Err(e) = save_wallet(&self.store, updated) {
                warn!(error = %e, "transfer sent but wallet not saved");
                store_warning = Some(format!("wallet not saved: {e}"));
            }
        }
        push_capped(
            &mut self.history,
            ActivityEntry {
                kind: ActivityKind::Transfer,
                amount: request.amount,
                from: request.from,
                to: request.to,
                result: reply.result.clone(),
                time: Utc::now(),
            },
        );
        if let Err(e) = self.save_history() {
            warn!(error = %e, "transfer sent but history not saved");
            store_warning.get_or_insert_with(|| format!("history not saved: {e}"));
        }

        Ok(TransferReceipt {
            result: reply.result,
            balance,
            balance_warning,
            store_warning,
        })
    }

    /// Forget the wallet and its history, here and in the store.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.phase = SessionPhase::Clearing;
        let removed = self
            .store
            .remove(WALLET_SLOT)
            .and_then(|()| self.store.remove(HISTORY_SLOT));
        if let Err(e) = removed {
            self.settle();
            return Err(e.into());
        }
        self.wallet = None;
        self.history.clear();
        self.phase = SessionPhase::NoWallet;
        Ok(())
    }

    /// The wallet record as pretty JSON, for the user to keep a copy.
    pub fn backup_json(&self) -> Result<String, SessionError> {
        let wallet = self.wallet.as_ref().ok_or(SessionError::NoWallet)?;
        Ok(serde_json::to_string_pretty(wallet).map_err(StoreError::from)?)
    }

    fn settle(&mut self) {
        self.phase = if self.wallet.is_some() {
            SessionPhase::HasWallet
        } else {
            SessionPhase::NoWallet
        };
    }

    fn replace(&mut self, wallet: Wallet) -> Result<&Wallet, SessionError> {
        save_wallet(&self.store, &wallet)?;
        self.phase = SessionPhase::HasWallet;
        Ok(self.wallet.insert(wallet))
    }

    fn save_history(&self) -> Result<(), StoreError> {
        self.store
            .set(HISTORY_SLOT, &serde_json::to_string(&self.history)?)
    }
}

fn save_wallet<S: WalletStore>(store: &S, wallet: &Wallet) -> Result<(), StoreError> {
    store.set(WALLET_SLOT, &serde_json::to_string(wallet)?)
}
