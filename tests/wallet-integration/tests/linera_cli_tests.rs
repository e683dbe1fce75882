#![cfg(unix)]

//! The real `LineraCli` bridge driving a stand-in `linera` shell script.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use chainritual_gateway::linera::{LineraCli, LineraConfig};
use chainritual_gateway::AppState;
use chainritual_wallet_integration::{spawn_gateway, PEER_CHAIN, TEST_CHAIN};
use serde_json::{json, Value};

/// Mimics the subcommands the gateway uses. Output formats follow the real
/// CLI: `request-chain` prints `<chain> <owner>`, balances end in a newline.
fn fake_linera(dir: &Path) -> PathBuf {
    let script = format!(
        r#"#!/bin/sh
[ "$1" = "--wallet" ] || {{ echo "missing --wallet" >&2; exit 2; }}
shift 2
case "$1 $2" in
  "wallet init") touch "$LINERA_WALLET"; echo "wallet initialized" ;;
  "wallet request-chain") echo "{TEST_CHAIN} 0x5f1c6e0aa8d2" ;;
  query-balance*) printf '950.\n' ;;
  transfer*)
    [ "$2" = "0.5" ] || {{ echo "Error: insufficient balance" >&2; exit 1; }}
    echo "transfer confirmed" ;;
  *) echo "unknown command: $*" >&2; exit 2 ;;
esac
"#
    );
    let path = dir.join("linera");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[tokio::test]
async fn gateway_over_scripted_cli() {
    tracing_subscriber::fmt::try_init().ok();
    let dir = tempfile::tempdir().unwrap();
    let wallet_path = dir.path().join("wallet.json");
    let config = LineraConfig {
        bin: fake_linera(dir.path()).display().to_string(),
        wallet_path: wallet_path.clone(),
        faucet_url: Some("http://faucet.invalid".into()),
    };
    let url = spawn_gateway(Arc::new(AppState::new(LineraCli::new(config)))).await;
    let client = reqwest::Client::new();

    // Wallet creation initializes the wallet file, then claims a chain.
    let body: Value = client
        .post(format!("{url}/wallet"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["chainId"], TEST_CHAIN);
    assert_eq!(body["accountId"], "0x5f1c6e0aa8d2");
    assert_eq!(body["balance"], "950.");
    assert!(wallet_path.exists());

    // Concurrent reads are serialized on the wallet file and all succeed.
    let reads = (0..4).map(|_| {
        client
            .post(format!("{url}/balance"))
            .json(&json!({ "chainId": TEST_CHAIN }))
            .send()
    });
    for resp in futures::future::join_all(reads).await {
        let body: Value = resp.unwrap().json().await.unwrap();
        assert_eq!(body["balance"], "950.");
    }

    let resp = client
        .post(format!("{url}/transfer"))
        .json(&json!({ "from": TEST_CHAIN, "to": PEER_CHAIN, "amount": "0.5" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["result"], "transfer confirmed");
    assert_eq!(body["balance"], "950.");

    // CLI failures surface verbatim as 500s.
    let resp = client
        .post(format!("{url}/transfer"))
        .json(&json!({ "from": TEST_CHAIN, "to": PEER_CHAIN, "amount": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Error: insufficient balance");
}
