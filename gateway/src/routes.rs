//! HTTP surface: create a wallet, read a balance, submit a transfer.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use chainritual_common::amount::Amount;
use chainritual_common::api::{
    BalanceRequest, BalanceResponse, CreateWalletResponse, HealthResponse, TransferResponse,
};
use chainritual_common::chain::ChainId;
use chainritual_common::wallet_backend::WalletBackend;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::error::ApiError;

pub struct AppState<B> {
    pub backend: B,
    /// Reported with every balance so clients can notice a network reset.
    pub genesis_hash: Option<String>,
    pub wallet_path: String,
    pub faucet_configured: bool,
}

impl<B: WalletBackend> AppState<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            genesis_hash: None,
            wallet_path: String::new(),
            faucet_configured: false,
        }
    }

    pub fn with_genesis_hash(mut self, genesis_hash: Option<String>) -> Self {
        self.genesis_hash = genesis_hash;
        self
    }
}

pub fn router<B: WalletBackend>(state: Arc<AppState<B>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/wallet", post(create_wallet::<B>))
        .route("/balance", get(balance_query::<B>).post(balance_body::<B>))
        .route("/transfer", post(transfer::<B>))
        .route("/health", get(health::<B>))
        .layer(cors)
        .with_state(state)
}

// ─── Wallet ─────────────────────────────────────────────────────────────────

async fn create_wallet<B: WalletBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Result<Json<CreateWalletResponse>, ApiError> {
    let credentials = state.backend.create_wallet().await?;
    let balance = state
        .backend
        .query_balance(credentials.chain_id.as_str())
        .await?;
    info!(chain = %credentials.chain_id, %balance, "wallet created");

    Ok(Json(CreateWalletResponse {
        chain_id: credentials.chain_id.into(),
        account_id: credentials.account_id,
        balance,
    }))
}

// ─── Balance ────────────────────────────────────────────────────────────────

async fn balance_query<B: WalletBackend>(
    State(state): State<Arc<AppState<B>>>,
    query: Result<Query<BalanceRequest>, QueryRejection>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let Query(req) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    balance_for(&state, req).await
}

async fn balance_body<B: WalletBackend>(
    State(state): State<Arc<AppState<B>>>,
    body: Bytes,
) -> Result<Json<BalanceResponse>, ApiError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        BalanceRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?
    };
    balance_for(&state, req).await
}

async fn balance_for<B: WalletBackend>(
    state: &AppState<B>,
    req: BalanceRequest,
) -> Result<Json<BalanceResponse>, ApiError> {
    let identifier = balance_identifier(req)?;
    let balance = state.backend.query_balance(&identifier).await?;
    Ok(Json(BalanceResponse {
        balance,
        genesis_hash: state.genesis_hash.clone(),
    }))
}

/// `chain` or `chain:account` for `query-balance`, checked before any
/// process is spawned.
fn balance_identifier(req: BalanceRequest) -> Result<String, ApiError> {
    let raw = non_empty(req.chain_id).ok_or(ApiError::MissingChainId)?;
    let chain = ChainId::parse(&raw)
        .map_err(|e| ApiError::BadRequest(format!("invalid chainId: {e}")))?;
    Ok(match non_empty(req.account_id) {
        Some(account) => chain.qualified(&account),
        None => chain.into(),
    })
}

// ─── Transfer ───────────────────────────────────────────────────────────────

/// Transfer body as received; every field may be absent and the amount may
/// arrive as a JSON string or number.
#[derive(Debug, Default, Deserialize)]
struct RawTransferRequest {
    from: Option<String>,
    to: Option<String>,
    amount: Option<serde_json::Value>,
}

#[derive(Debug, PartialEq, Eq)]
struct ValidTransfer {
    from: String,
    to: String,
    amount: String,
}

fn validate_transfer(body: &[u8]) -> Result<ValidTransfer, ApiError> {
    let raw: RawTransferRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))?;

    let amount = raw.amount.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let (from, to, amount) = (non_empty(raw.from), non_empty(raw.to), non_empty(amount));

    let missing: Vec<&str> = [("from", from.is_none()), ("to", to.is_none()), ("amount", amount.is_none())]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
    let (Some(from), Some(to), Some(amount)) = (from, to, amount) else {
        return Err(ApiError::BadRequest(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    };

    Amount::parse_positive(&amount).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    ChainId::parse(&to)
        .map_err(|e| ApiError::BadRequest(format!("invalid recipient: {e}")))?;

    Ok(ValidTransfer { from, to, amount })
}

async fn transfer<B: WalletBackend>(
    State(state): State<Arc<AppState<B>>>,
    body: Bytes,
) -> Result<Json<TransferResponse>, ApiError> {
    let req = validate_transfer(&body)?;
    let outcome = state
        .backend
        .transfer(&req.amount, &req.from, &req.to)
        .await?;

    let (balance, balance_error) = match outcome.balance {
        Ok(balance) => (Some(balance), None),
        Err(e) => (None, Some(e.diagnostic().to_string())),
    };
    Ok(Json(TransferResponse {
        success: true,
        result: outcome.result,
        balance,
        balance_error,
    }))
}

// ─── Health ─────────────────────────────────────────────────────────────────

async fn health<B: WalletBackend>(State(state): State<Arc<AppState<B>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.backend.backend_name().to_string(),
        wallet_path: state.wallet_path.clone(),
        faucet_configured: state.faucet_configured,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
