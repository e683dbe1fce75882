//! Decimal token amounts as the `linera` CLI prints them.
//!
//! Balances travel as text (`"950."`, `"12.5"`) and are stored and forwarded
//! verbatim. [`Amount`] exists only so the client can compare two of them
//! exactly; it is never used to produce text sent anywhere.

/// Fractional digits carried by a Linera amount (1 token = 10^18 atto).
pub const DECIMAL_PLACES: usize = 18;

const ATTO_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount {0:?} is not a decimal number")]
    NotDecimal(String),
    #[error("amount {0:?} has more than 18 decimal places")]
    TooPrecise(String),
    #[error("amount {0:?} is too large")]
    Overflow(String),
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// Exact fixed-point amount in atto units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    /// Parse `123`, `123.`, `123.45` or `.5`. Signs, exponents and
    /// `inf`/`nan` are rejected.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(AmountError::NotDecimal(s.to_string()));
        }
        if frac_part.len() > DECIMAL_PLACES {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let overflow = || AmountError::Overflow(s.to_string());
        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut frac: u128 = if frac_part.is_empty() {
            0
        } else {
            frac_part.parse().map_err(|_| overflow())?
        };
        for _ in frac_part.len()..DECIMAL_PLACES {
            frac *= 10;
        }

        whole
            .checked_mul(ATTO_PER_TOKEN)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(overflow)
    }

    /// Parse and require a value strictly greater than zero.
    pub fn parse_positive(raw: &str) -> Result<Self, AmountError> {
        let amount = Self::parse(raw)?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
