//! BTC up/down prediction form.
//!
//! Bets are priced and ticketed locally, but nothing settles them yet: the
//! market contract on [`MARKET_CHAIN_ID`] is not deployed, so
//! [`place_bet`] always refuses.

use chainritual_common::chain::{ChainId, ChainIdError, MARKET_CHAIN_ID};
use chainritual_common::market::{BetTicket, Side};
use chainritual_common::wallet::Wallet;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::transfer_form::{check_amount, max_amount, ValidationError};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarketError {
    #[error("pick UP or DOWN first")]
    NoSide,
    #[error("create a wallet first")]
    NoWallet,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("the betting round for this ticket has closed")]
    RoundClosed,
    #[error("market settlement is under development")]
    SettlementUnavailable,
}

/// Chain that will host the market application.
pub fn market_chain() -> Result<ChainId, ChainIdError> {
    ChainId::parse(MARKET_CHAIN_ID)
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarketForm {
    pub side: Option<Side>,
    pub amount: String,
}

impl MarketForm {
    pub fn new(side: Option<Side>, amount: impl Into<String>) -> Self {
        Self {
            side,
            amount: amount.into(),
        }
    }

    /// Ticket for this bet at `price`, opening a round at `now`.
    pub fn prepare(
        &self,
        wallet: Option<&Wallet>,
        price: &str,
        now: DateTime<Utc>,
    ) -> Result<BetTicket, MarketError> {
        let wallet = wallet.ok_or(MarketError::NoWallet)?;
        let side = self.side.ok_or(MarketError::NoSide)?;
        check_amount(&self.amount, wallet.balance())?;
        Ok(BetTicket::open(
            side,
            self.amount.trim().to_string(),
            price.to_string(),
            now,
        ))
    }

    pub fn fill_max(&mut self, cached_balance: &str) -> Result<(), MarketError> {
        self.amount = max_amount(cached_balance)?.to_string();
        Ok(())
    }
}

/// Submit `ticket`. Expired tickets are refused outright; live ones are
/// refused until settlement exists.
pub fn place_bet(ticket: &BetTicket, now: DateTime<Utc>) -> Result<(), MarketError> {
    if ticket.is_expired(now) {
        return Err(MarketError::RoundClosed);
    }
    info!(
        side = %ticket.side,
        amount = %ticket.amount,
        entry_price = %ticket.entry_price,
        "bet not placed: settlement unavailable"
    );
    Err(MarketError::SettlementUnavailable)
}
