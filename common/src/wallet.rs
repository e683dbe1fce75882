use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::ChainId;

/// Most recent activity entries kept in the persisted history.
pub const HISTORY_LIMIT: usize = 50;

/// The single wallet record held by a client session.
///
/// Chain and account ids are fixed at construction. The balance is whatever
/// the gateway last reported and is only ever replaced, never derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    chain_id: ChainId,
    account_id: String,
    balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genesis_hash: Option<String>,
}

impl Wallet {
    pub fn new(chain_id: ChainId, account_id: impl Into<String>, balance: impl Into<String>) -> Self {
        Self {
            chain_id,
            account_id: account_id.into(),
            balance: balance.into(),
            genesis_hash: None,
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn balance(&self) -> &str {
        &self.balance
    }

    pub fn genesis_hash(&self) -> Option<&str> {
        self.genesis_hash.as_deref()
    }

    /// Copy of this record with a freshly reported balance.
    pub fn with_balance(&self, balance: impl Into<String>) -> Self {
        Self {
            balance: balance.into(),
            ..self.clone()
        }
    }

    pub fn with_genesis_hash(&self, genesis_hash: Option<String>) -> Self {
        Self {
            genesis_hash,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Transfer,
}

/// One line of the client-side activity log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub amount: String,
    pub from: String,
    pub to: String,
    /// Raw output of the transfer command.
    pub result: String,
    pub time: DateTime<Utc>,
}

/// Append `entry`, dropping the oldest entries beyond [`HISTORY_LIMIT`].
pub fn push_capped(history: &mut Vec<ActivityEntry>, entry: ActivityEntry) {
    history.push(entry);
    if history.len() > HISTORY_LIMIT {
        let excess = history.len() - HISTORY_LIMIT;
        history.drain(..excess);
    }
}
