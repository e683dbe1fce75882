use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of one prediction round.
pub const ROUND_SECS: i64 = 300;

/// Direction of a BTC/USD price bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Up,
    Down,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Up => write!(f, "UP"),
            Side::Down => write!(f, "DOWN"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UP" => Ok(Side::Up),
            "DOWN" => Ok(Side::Down),
            other => Err(format!("unknown side {other:?} (expected UP or DOWN)")),
        }
    }
}

/// A bet as the market form would submit it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetTicket {
    pub side: Side,
    pub amount: String,
    pub entry_price: String,
    pub expires_at: DateTime<Utc>,
}

impl BetTicket {
    pub fn open(side: Side, amount: String, entry_price: String, now: DateTime<Utc>) -> Self {
        Self {
            side,
            amount,
            entry_price,
            expires_at: now + Duration::seconds(ROUND_SECS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
