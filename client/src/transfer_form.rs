//! Client-side checks run before a transfer leaves the machine.
//!
//! These only guard against obvious mistakes; the `linera` CLI behind the
//! gateway remains the authority on whether a transfer is possible.

use chainritual_common::amount::{Amount, AmountError};
use chainritual_common::api::TransferRequest;
use chainritual_common::chain::ChainId;
use chainritual_common::wallet::Wallet;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("recipient must be a 64-character lowercase hex chain id")]
    InvalidRecipient,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("amount {requested} exceeds balance {available}")]
    InsufficientBalance { available: String, requested: String },
    #[error("no balance available")]
    EmptyBalance,
}

/// Check `amount` is positive and within the cached balance.
pub fn check_amount(amount: &str, cached_balance: &str) -> Result<Amount, ValidationError> {
    let requested = Amount::parse_positive(amount)?;
    let available = Amount::parse(cached_balance).map_err(|_| ValidationError::EmptyBalance)?;
    if requested > available {
        return Err(ValidationError::InsufficientBalance {
            available: cached_balance.trim().to_string(),
            requested: amount.trim().to_string(),
        });
    }
    Ok(requested)
}

/// Amount text to put in a form when the user asks for "MAX".
pub fn max_amount(cached_balance: &str) -> Result<&str, ValidationError> {
    match Amount::parse(cached_balance) {
        Ok(balance) if !balance.is_zero() => Ok(cached_balance),
        _ => Err(ValidationError::EmptyBalance),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
}

impl TransferForm {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
        }
    }

    /// Build the request to send, or say why it must not be sent.
    pub fn validate(&self, wallet: &Wallet) -> Result<TransferRequest, ValidationError> {
        let to = ChainId::parse(&self.recipient).map_err(|_| ValidationError::InvalidRecipient)?;
        check_amount(&self.amount, wallet.balance())?;
        Ok(TransferRequest {
            from: wallet.chain_id().to_string(),
            to: to.into(),
            amount: self.amount.trim().to_string(),
        })
    }

    /// Fill the amount with the whole cached balance. Leaves the form
    /// untouched when there is nothing to send.
    pub fn fill_max(&mut self, cached_balance: &str) -> Result<(), ValidationError> {
        self.amount = max_amount(cached_balance)?.to_string();
        Ok(())
    }
}
