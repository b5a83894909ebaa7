//! Scripted in-memory transport for exercising the client without a node.

#![allow(dead_code)]

use async_trait::async_trait;
use compass_dash::rpc::{ClientError, RpcClient, Transport};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// Canned reply for one method
#[derive(Clone)]
pub enum Reply {
    /// Wrapped as `{"result": ...}`
    Result(Value),
    /// Wrapped as `{"error": {code, message}}`
    RpcError(i64, &'static str),
    /// Returned verbatim as the response body
    Raw(Value),
    /// Transport failure
    Down,
}

#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    requests: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, method: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(method.to_string(), reply);
    }

    pub fn ok(&self, method: &str, result: Value) {
        self.reply(method, Reply::Result(result));
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r["method"].as_str().map(str::to_string))
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| *m == method).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(&self, _url: &str, body: &Value) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(body.clone());
        let method = body["method"].as_str().unwrap_or_default().to_string();
        let id = body["id"].clone();
        let reply = self.replies.lock().unwrap().get(&method).cloned();
        match reply {
            Some(Reply::Result(v)) => Ok(json!({"jsonrpc": "2.0", "result": v, "id": id})),
            Some(Reply::RpcError(code, message)) => Ok(json!({
                "jsonrpc": "2.0",
                "error": {"code": code, "message": message},
                "id": id
            })),
            Some(Reply::Raw(v)) => Ok(v),
            Some(Reply::Down) => Err(ClientError::Transport("connection refused".into())),
            None => Ok(json!({
                "jsonrpc": "2.0",
                "error": {"code": -32601, "message": format!("Method not found: {method}")},
                "id": id
            })),
        }
    }
}

/// Holds every call until `n` calls are waiting, then answers them from the
/// inner mock. Calls issued one after another never get past the first.
pub struct GatedTransport {
    inner: Arc<MockTransport>,
    gate: Barrier,
}

impl GatedTransport {
    pub fn new(inner: Arc<MockTransport>, n: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            gate: Barrier::new(n),
        })
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        self.gate.wait().await;
        self.inner.post(url, body).await
    }
}

pub fn gated_client(transport: &Arc<GatedTransport>) -> Arc<RpcClient> {
    Arc::new(RpcClient::new("http://node.test/", transport.clone()))
}

pub fn client(transport: &Arc<MockTransport>) -> Arc<RpcClient> {
    Arc::new(RpcClient::new("http://node.test/", transport.clone()))
}

pub fn block(index: u64, kind: Value) -> Value {
    json!({
        "header": {
            "index": index,
            "block_type": kind,
            "proposer": "node-1",
            "signature_hex": "00ff",
            "prev_hash": format!("h{}", index.saturating_sub(1)),
            "hash": format!("h{index}"),
            "timestamp": 1_700_000_000_000u64 + index
        },
        "transactions": []
    })
}

/// A node that answers every dashboard call
pub fn healthy_dashboard(t: &MockTransport, height: u64) {
    t.ok("getChainHeight", json!({"height": height}));
    t.ok(
        "getNodeInfo",
        json!({"height": height, "head_hash": "abc123", "version": "1.4.0", "peer_count": 2}),
    );
    t.ok("getPeers", json!({"peers": ["10.0.0.2:9000", "10.0.0.3:9000"]}));
    t.ok(
        "getLatestBlocks",
        json!([block(height, json!("Work")), block(height - 1, json!({"PoH": {"tick": 9, "iterations": 1, "hash": "x"}}))]),
    );
    t.ok("getOraclePrices", json!({"BTCUSDT": 64000.5}));
}
