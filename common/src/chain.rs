use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of hex characters in a microchain identifier.
pub const CHAIN_ID_LEN: usize = 64;

/// Chain the BTC prediction market lives on.
pub const MARKET_CHAIN_ID: &str =
    "f871bc86b3fc1fbdb0e5a7aa505f974fa0468878606edef8683fdd2489f8c8db";

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainIdError {
    #[error("chain id must be 64 characters, got {0}")]
    Length(usize),
    #[error("chain id must be lowercase hex, found {0:?}")]
    InvalidChar(char),
}

/// A microchain identifier: exactly 64 lowercase hex characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChainId(String);

impl ChainId {
    /// Parse a chain id, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self, ChainIdError> {
        let s = raw.trim();
        if s.len() != CHAIN_ID_LEN {
            return Err(ChainIdError::Length(s.chars().count()));
        }
        if let Some(c) = s
            .chars()
            .find(|c| !matches!(c, '0'..='9' | 'a'..='f'))
        {
            return Err(ChainIdError::InvalidChar(c));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Balance-query identifier for an account on this chain (`chain:account`).
    pub fn qualified(&self, account_id: &str) -> String {
        format!("{}:{}", self.0, account_id.trim())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ChainId {
    type Error = ChainIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ChainId> for String {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl AsRef<str> for ChainId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
