mod common;

use common::{client, MockTransport, Reply};
use compass_dash::rpc::ClientError;
use serde_json::{json, Value};

#[tokio::test]
async fn request_ids_start_at_one_and_increase() {
    let t = MockTransport::new();
    t.ok("getChainHeight", json!({"height": 5}));
    let c = client(&t);

    for _ in 0..3 {
        c.call("getChainHeight", Value::Null).await.unwrap();
    }
    c.call("getPeers", Value::Null).await.unwrap_err();

    let ids: Vec<u64> = t.requests().iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn concurrent_calls_never_share_an_id() {
    let t = MockTransport::new();
    t.ok("getChainHeight", json!({"height": 5}));
    let c = client(&t);

    let calls = (0..20).map(|_| c.call("getChainHeight", Value::Null));
    futures::future::join_all(calls).await;

    let mut ids: Vec<u64> = t.requests().iter().map(|r| r["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn envelope_shape_on_the_wire() {
    let t = MockTransport::new();
    t.ok("getBalance", json!({"balance": 1_000_000}));
    let c = client(&t);

    let bal = c.get_balance("alice", "COMPASS").await.unwrap();
    assert_eq!(bal, 1_000_000);
    assert_eq!(
        t.requests()[0],
        json!({
            "jsonrpc": "2.0",
            "method": "getBalance",
            "params": {"wallet_id": "alice", "asset": "COMPASS"},
            "id": 1
        })
    );
}

#[tokio::test]
async fn node_error_surfaces_as_rpc_error() {
    let t = MockTransport::new();
    t.reply("getBlock", Reply::RpcError(-32602, "Block not found"));
    let c = client(&t);

    let err = c.get_block(999).await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Rpc {
            code: -32602,
            message: "Block not found".into()
        }
    );
}

#[tokio::test]
async fn transport_and_malformed_payloads_are_transport_errors() {
    let t = MockTransport::new();
    t.reply("getPeers", Reply::Down);
    t.reply("getNodeInfo", Reply::Raw(json!({"jsonrpc": "2.0", "id": 1})));
    t.ok("getChainHeight", json!({"tip": 3}));
    let c = client(&t);

    assert!(matches!(c.get_peers().await, Err(ClientError::Transport(_))));
    assert!(matches!(c.get_node_info().await, Err(ClientError::Transport(_))));
    assert!(matches!(c.get_chain_height().await, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn error_member_without_code_and_message_is_transport_error() {
    let t = MockTransport::new();
    t.reply("getPeers", Reply::Raw(json!({"jsonrpc": "2.0", "error": "boom", "id": 1})));
    t.reply("getNodeInfo", Reply::Raw(json!({"jsonrpc": "2.0", "error": {}, "id": 2})));
    let c = client(&t);

    assert!(matches!(c.get_peers().await, Err(ClientError::Transport(_))));
    assert!(matches!(c.get_node_info().await, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn endpoint_change_applies_to_next_call() {
    let t = MockTransport::new();
    let c = client(&t);
    assert!(c.set_endpoint("ftp://nope").is_err());
    assert_eq!(c.endpoint(), "http://node.test/");
    c.set_endpoint("https://other.node:9000/").unwrap();
    assert_eq!(c.endpoint(), "https://other.node:9000/");
}

#[tokio::test]
async fn typed_wrappers_decode_node_shapes() {
    let t = MockTransport::new();
    t.ok(
        "getAccountBalances",
        json!({"account": "alice", "layer1": {"COMPASS": 3_000_000}, "layer2": {}, "layer3": {"COMPUTE": 12}}),
    );
    t.ok(
        "getModelEpochStats",
        json!({
            "model_id": "signal_btc_v2", "ticker": "BTC", "current_epoch": 11,
            "predictions_in_epoch": 4, "epoch_progress": 0.4, "correct_in_epoch": 3,
            "total_predictions": 100, "total_correct": 80, "overall_accuracy": 0.8,
            "epochs_completed": 10, "nft_minted": false, "nft_token_id": null, "should_mint": true,
            "config": {"predictions_per_epoch": 10, "mint_at_epoch": 10,
                       "min_accuracy_to_mint": 0.75, "verification_delay_secs": 60}
        }),
    );
    t.ok("trainModel", json!({"status": "training_started", "ticker": "BTC", "message": "Training started for BTC"}));
    let c = client(&t);

    let balances = c.get_account_balances("alice").await.unwrap();
    assert_eq!(balances["COMPASS"], 3_000_000);
    assert_eq!(balances["COMPUTE"], 12);

    let p = c.get_model_epoch_stats("BTC", "signal_btc_v2", "alice").await.unwrap();
    assert!(p.is_mintable());
    assert_eq!(p.progress_ratio(), 0.4);

    assert_eq!(c.train_model("BTC").await.unwrap(), "Training started for BTC");
    let req = t.requests().pop().unwrap();
    assert_eq!(req["params"], json!({"ticker": "BTC"}));
}
