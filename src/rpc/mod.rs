//! JSON-RPC client for the Compass node.
//!
//! Every call is wrapped in a `{"jsonrpc":"2.0","method","params","id"}`
//! envelope with a per-client id that starts at 1 and increases by one per
//! call. The response is unwrapped into its `result`, or into a
//! [`ClientError`] when the node reports an error or the transport fails.
//!
//! The client does not queue: any number of calls may be in flight at once
//! and nothing orders their completion.

pub mod methods;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Errors surfaced by [`RpcClient::call`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    /// Network failure, non-2xx status, or a payload that is not a valid
    /// response envelope.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed error object reported by the node.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ClientError {
    pub fn malformed(what: impl std::fmt::Display) -> Self {
        ClientError::Transport(format!("malformed payload: {what}"))
    }
}

/// Outgoing request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
}

impl RpcRequest {
    pub fn new(method: &str, params: Value, id: u64) -> Self {
        // Methods without arguments still send an (empty) object
        let params = if params.is_null() { json!({}) } else { params };
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id,
        }
    }
}

/// Error object inside a response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

/// Incoming response envelope: `result` xor `error`
#[derive(Debug, Clone, PartialEq)]
pub enum RpcResponse {
    Result(Value),
    Error(RpcErrorObject),
}

impl RpcResponse {
    /// Classify a raw response body.
    ///
    /// An `error` member wins over `result` when a node sends both.
    pub fn from_value(v: Value) -> Result<Self, ClientError> {
        let Value::Object(mut map) = v else {
            return Err(ClientError::malformed("response is not an object"));
        };
        if let Some(err) = map.remove("error").filter(|e| !e.is_null()) {
            // Anything but an integer code plus a string message is a broken
            // envelope, not a node-reported error
            return serde_json::from_value::<RpcErrorObject>(err)
                .map(RpcResponse::Error)
                .map_err(|_| ClientError::malformed("error member is not {code, message}"));
        }
        match map.remove("result") {
            Some(r) => Ok(RpcResponse::Result(r)),
            None => Err(ClientError::malformed("no result or error member")),
        }
    }

    pub fn into_result(self) -> Result<Value, ClientError> {
        match self {
            RpcResponse::Result(v) => Ok(v),
            RpcResponse::Error(e) => Err(ClientError::Rpc {
                code: e.code,
                message: e.message,
            }),
        }
    }
}

/// Moves one request body to the node and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError>;
}

/// HTTP POST transport backed by reqwest
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ClientError::Transport(format!("http client: {e}")))?;
        Ok(Self { http, timeout })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: &Value) -> Result<Value, ClientError> {
        let mut req = self.http.post(url).json(body);
        if let Some(t) = self.timeout {
            req = req.timeout(t);
        }

        let res = req
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ClientError::Transport(format!("http {}", res.status())));
        }
        res.json::<Value>()
            .await
            .map_err(|e| ClientError::malformed(e))
    }
}

/// JSON-RPC client with a runtime-editable endpoint
pub struct RpcClient {
    endpoint: RwLock<String>,
    next_id: AtomicU64,
    transport: Arc<dyn Transport>,
}

impl RpcClient {
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: RwLock::new(endpoint.into()),
            next_id: AtomicU64::new(1),
            transport,
        }
    }

    /// Client over HTTP, without a request timeout unless one is given.
    pub fn http(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ClientError> {
        Ok(Self::new(endpoint, Arc::new(HttpTransport::new(timeout)?)))
    }

    pub fn endpoint(&self) -> String {
        match self.endpoint.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Point subsequent calls at a new URL; in-flight calls keep the old one.
    pub fn set_endpoint(&self, url: &str) -> anyhow::Result<()> {
        crate::config::validate_url(url, "RPC endpoint")?;
        let mut guard = match self.endpoint.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        log::info!("RPC endpoint changed: {} -> {}", *guard, url);
        *guard = url.to_string();
        Ok(())
    }

    /// Issue one call and unwrap its result.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(method, params, id);
        let body = serde_json::to_value(&request).map_err(|e| ClientError::malformed(e))?;
        let url = self.endpoint();

        log::debug!("rpc -> {method} id={id}");
        let raw = self.transport.post(&url, &body).await.map_err(|e| {
            log::debug!("rpc <- {method} id={id} transport failure: {e}");
            e
        })?;

        let outcome = RpcResponse::from_value(raw).and_then(RpcResponse::into_result);
        if let Err(e) = &outcome {
            log::debug!("rpc <- {method} id={id} failed: {e}");
        }
        outcome
    }
}
