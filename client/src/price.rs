//! BTC/USD price for the market view, with the last good value cached in the
//! store so the view still has something to show when the feed is down.

use std::time::Duration;

use tracing::{debug, warn};

use crate::store::{StoreError, WalletStore, PRICE_SLOT};

pub const DEFAULT_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";

/// How often `price --watch` polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("price unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A price and whether it came from the feed just now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PriceQuote {
    Live(String),
    Cached(String),
}

impl PriceQuote {
    pub fn price(&self) -> &str {
        match self {
            PriceQuote::Live(p) | PriceQuote::Cached(p) => p,
        }
    }
}

pub struct PriceFeed {
    client: reqwest::Client,
    url: String,
}

impl PriceFeed {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn fetch(&self) -> Result<String, PriceError> {
        debug!(url = %self.url, "fetching BTC price");
        let unavailable = |e: reqwest::Error| PriceError::Unavailable(e.to_string());
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let body = response.text().await.map_err(unavailable)?;
        parse_price(&body)
    }

    /// Fetch the live price and cache it, or fall back to the cached one.
    pub async fn latest(&self, store: &impl WalletStore) -> Result<PriceQuote, PriceError> {
        match self.fetch().await {
            Ok(price) => {
                store.set(PRICE_SLOT, &price)?;
                Ok(PriceQuote::Live(price))
            }
            Err(e) => {
                warn!(error = %e, "price feed failed, using cached value");
                match store.get(PRICE_SLOT)? {
                    Some(cached) => Ok(PriceQuote::Cached(cached)),
                    None => Err(e),
                }
            }
        }
    }
}

/// Extract `bitcoin.usd` from a price response, to two decimals.
pub fn parse_price(body: &str) -> Result<String, PriceError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PriceError::Unavailable(e.to_string()))?;
    let usd = value
        .get("bitcoin")
        .and_then(|b| b.get("usd"))
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| PriceError::Unavailable("response has no bitcoin.usd".into()))?;
    Ok(format!("{usd:.2}"))
}
