//! Client session against a live gateway backed by a scripted wallet.

use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use chainritual_client::api::ApiError;
use chainritual_client::config::Endpoints;
use chainritual_client::transfer_form::{TransferForm, ValidationError};
use chainritual_client::{FileStore, HttpGateway, SessionError, SessionPhase, WalletSession};
use chainritual_gateway::AppState;
use chainritual_wallet_integration::{
    serve, spawn_gateway, ScriptedBackend, PEER_CHAIN, TEST_CHAIN,
};
use serde_json::{json, Value};

async fn gateway_with(backend: ScriptedBackend) -> (Arc<AppState<ScriptedBackend>>, String) {
    tracing_subscriber::fmt::try_init().ok();
    let state = Arc::new(AppState::new(backend));
    let url = spawn_gateway(state.clone()).await;
    (state, url)
}

fn session_at(dir: &Path, base_url: &str) -> WalletSession<FileStore, HttpGateway> {
    WalletSession::open(
        FileStore::new(dir),
        HttpGateway::new(Endpoints::from_base(base_url)),
    )
    .unwrap()
}

#[tokio::test]
async fn create_refresh_transfer_and_reload() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at(dir.path(), &url);

    let wallet = session.create_wallet().await.unwrap();
    assert_eq!(wallet.chain_id().as_str(), TEST_CHAIN);
    assert_eq!(wallet.balance(), "950.");

    state.backend.script(|s| s.balance = "960.".into());
    assert_eq!(session.refresh_balance().await.unwrap().balance(), "960.");

    state
        .backend
        .script(|s| s.balance_after_transfer = Some("950.".into()));
    let receipt = session
        .transfer(&TransferForm::new(PEER_CHAIN, "10"))
        .await
        .unwrap();
    assert_eq!(receipt.balance, "950.");
    assert_eq!(receipt.balance_warning, None);
    assert_eq!(
        state.backend.transfers(),
        vec![("10".to_string(), TEST_CHAIN.to_string(), PEER_CHAIN.to_string())]
    );

    let saved = session.wallet().cloned();
    drop(session);
    let reopened = session_at(dir.path(), &url);
    assert_eq!(reopened.wallet().cloned(), saved);
    assert_eq!(reopened.phase(), SessionPhase::HasWallet);
    assert_eq!(reopened.history().len(), 1);
}

#[tokio::test]
async fn create_failure_is_reported_and_nothing_saved() {
    let backend = ScriptedBackend::default();
    backend.script(|s| s.create_error = Some("faucet unreachable".into()));
    let (_state, url) = gateway_with(backend).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at(dir.path(), &url);

    match session.create_wallet().await {
        Err(SessionError::Api(ApiError::Server { status, message })) => {
            assert_eq!(status, 500);
            assert!(message.contains("faucet unreachable"), "{message}");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(session.wallet().is_none());
    assert!(!dir.path().join("wallet.json").exists());
}

#[tokio::test]
async fn transfer_with_failed_reread_still_succeeds() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;
    state.backend.script(|s| s.balance_error = Some("timeout".into()));

    let resp = reqwest::Client::new()
        .post(format!("{url}/transfer"))
        .json(&json!({ "from": TEST_CHAIN, "to": PEER_CHAIN, "amount": "10" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["balance"], Value::Null);
    assert!(body["balanceError"].as_str().unwrap().contains("timeout"));
}

#[tokio::test]
async fn session_keeps_prior_balance_when_reread_fails() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at(dir.path(), &url);
    session.create_wallet().await.unwrap();

    state.backend.script(|s| s.balance_error = Some("timeout".into()));
    let receipt = session
        .transfer(&TransferForm::new(PEER_CHAIN, "10"))
        .await
        .unwrap();
    assert_eq!(receipt.balance, "950.");
    assert!(receipt.balance_warning.unwrap().contains("timeout"));
    assert_eq!(session.wallet().unwrap().balance(), "950.");
}

#[tokio::test]
async fn missing_transfer_fields_are_rejected_before_the_backend() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;

    let resp = reqwest::Client::new()
        .post(format!("{url}/transfer"))
        .json(&json!({ "from": TEST_CHAIN }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "missing required field(s): to, amount");
    assert_eq!(state.backend.calls(), 0);
}

#[tokio::test]
async fn invalid_recipient_never_leaves_the_client() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at(dir.path(), &url);
    session.create_wallet().await.unwrap();
    let calls = state.backend.calls();

    let err = session
        .transfer(&TransferForm::new("not-a-chain", "10"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(ValidationError::InvalidRecipient)
    ));
    assert_eq!(state.backend.calls(), calls);
    assert!(state.backend.transfers().is_empty());
}

#[tokio::test]
async fn balance_without_chain_id_is_a_server_error() {
    let (_state, url) = gateway_with(ScriptedBackend::default()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{url}/balance")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "chainId not provided");

    let resp = client
        .get(format!("{url}/balance"))
        .query(&[("chainId", TEST_CHAIN)])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["balance"], "950.");
}

#[tokio::test]
async fn malformed_balance_queries_are_json_bad_requests() {
    let (state, url) = gateway_with(ScriptedBackend::default()).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{url}/balance?chainId={TEST_CHAIN}&chainId={PEER_CHAIN}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string(), "{body}");

    let resp = client
        .post(format!("{url}/balance"))
        .json(&json!({ "chainId": "not-a-chain" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("invalid chainId"));
    assert_eq!(state.backend.calls(), 0);
}

#[tokio::test]
async fn genesis_change_clears_the_stored_wallet() {
    tracing_subscriber::fmt::try_init().ok();
    let before_reset =
        AppState::new(ScriptedBackend::default()).with_genesis_hash(Some("g1".into()));
    let first = spawn_gateway(Arc::new(before_reset)).await;
    let dir = tempfile::tempdir().unwrap();

    let mut session = session_at(dir.path(), &first);
    session.create_wallet().await.unwrap();
    let wallet = session.refresh_balance().await.unwrap();
    assert_eq!(wallet.genesis_hash(), Some("g1"));
    drop(session);

    let reset = AppState::new(ScriptedBackend::default()).with_genesis_hash(Some("g2".into()));
    let second = spawn_gateway(Arc::new(reset)).await;
    let mut session = session_at(dir.path(), &second);
    assert!(matches!(
        session.refresh_balance().await,
        Err(SessionError::ChainInactive)
    ));
    assert_eq!(session.phase(), SessionPhase::NoWallet);
    assert!(!dir.path().join("wallet.json").exists());
}

#[tokio::test]
async fn html_reply_is_an_invalid_response() {
    let bad_gateway = || async { (StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>") };
    let app = Router::new()
        .route("/wallet", post(bad_gateway))
        .route("/balance", post(bad_gateway));
    let url = serve(app).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_at(dir.path(), &url);

    let err = session.create_wallet().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Api(ApiError::InvalidResponse { status: 502, .. })
    ));
    assert_eq!(err.to_string(), "invalid server response");
    assert_eq!(session.phase(), SessionPhase::NoWallet);
}

#[tokio::test]
async fn health_reports_backend() {
    let (_state, url) = gateway_with(ScriptedBackend::default()).await;
    let body: Value = reqwest::get(format!("{url}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "scripted");
    assert_eq!(body["faucetConfigured"], false);
}
