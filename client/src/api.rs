//! HTTP client for the gateway routes.

use std::future::Future;

use chainritual_common::api::{
    BalanceRequest, BalanceResponse, CreateWalletResponse, TransferRequest, TransferResponse,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Endpoints;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The body was not the JSON we expected.
    #[error("invalid server response")]
    InvalidResponse { status: u16, detail: String },
    /// The gateway answered with `{ "error": … }` or a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },
}

/// The three gateway operations the session depends on.
pub trait GatewayApi: Send + Sync {
    fn create_wallet(&self) -> impl Future<Output = Result<CreateWalletResponse, ApiError>> + Send;

    fn balance(
        &self,
        chain_id: &str,
    ) -> impl Future<Output = Result<BalanceResponse, ApiError>> + Send;

    fn transfer(
        &self,
        request: &TransferRequest,
    ) -> impl Future<Output = Result<TransferResponse, ApiError>> + Send;
}

/// [`GatewayApi`] over reqwest.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpGateway {
    pub fn new(endpoints: Endpoints) -> Self {
        Self::with_client(reqwest::Client::new(), endpoints)
    }

    pub fn with_client(client: reqwest::Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    async fn post<B, T>(&self, url: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(%url, "gateway request");
        let mut request = self.client.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let transport = |source| ApiError::Transport {
            url: url.to_string(),
            source,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        decode(status, &text)
    }
}

impl GatewayApi for HttpGateway {
    async fn create_wallet(&self) -> Result<CreateWalletResponse, ApiError> {
        self.post::<(), _>(&self.endpoints.wallet, None).await
    }

    async fn balance(&self, chain_id: &str) -> Result<BalanceResponse, ApiError> {
        let body = BalanceRequest {
            chain_id: Some(chain_id.to_string()),
            account_id: None,
        };
        self.post(&self.endpoints.balance, Some(&body)).await
    }

    async fn transfer(&self, request: &TransferRequest) -> Result<TransferResponse, ApiError> {
        self.post(&self.endpoints.transfer, Some(request)).await
    }
}

/// Turn a gateway reply into `T`, an `{error}` into [`ApiError::Server`], and
/// anything unparseable into [`ApiError::InvalidResponse`].
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let invalid = |detail: String| ApiError::InvalidResponse {
        status: status.as_u16(),
        detail,
    };
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ApiError::Server {
            status: status.as_u16(),
            message,
        });
    }
    if !status.is_success() {
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: format!("gateway returned {status}"),
        });
    }
    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}
