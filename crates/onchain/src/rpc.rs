//! Read-only contract calls over Ethereum JSON-RPC.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use dipzy_core::http::StatusCode;
use dipzy_core::{
    classify_status, ApiError, ApiRequest, ClientConfig, Clock, Credential, Credentials, Outcome,
    RequestExecutor, ResponsePolicy,
};
use log::debug;
use serde_json::{json, Value};

use crate::errors::{ChainError, Result};

pub const PROVIDER_ID: &str = "JSON_RPC";

/// Connection able to execute `eth_call` against the latest block.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// Encode `call`, send it to `to` and decode the return values.
pub async fn call_contract<C: SolCall>(
    client: &dyn ChainClient,
    to: Address,
    call: &C,
) -> Result<C::Return> {
    let output = client.call(to, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&output, true).map_err(|e| ChainError::Abi {
        function: C::SIGNATURE,
        message: e.to_string(),
    })
}

/// JSON-RPC errors come back as `200 OK` with an `error` object.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRpcPolicy;

impl ResponsePolicy for JsonRpcPolicy {
    fn provider(&self) -> &'static str {
        PROVIDER_ID
    }

    fn classify_response(&self, status: StatusCode, body: &str) -> Outcome {
        match classify_status(status, body) {
            Outcome::Success(value) => match value.get("error") {
                Some(error) if !error.is_null() => Outcome::Provider {
                    message: error
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| error.to_string()),
                },
                _ => Outcome::Success(value),
            },
            other => other,
        }
    }
}

/// [`ChainClient`] over HTTP JSON-RPC.
pub struct JsonRpcClient {
    executor: RequestExecutor<JsonRpcPolicy>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// `url` is the node endpoint, API key included where the node wants it.
    /// The whole URL is masked in logs and errors.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_config(url, ClientConfig::default())
    }

    pub fn with_config(url: impl Into<String>, config: ClientConfig) -> Self {
        let url = url.into();
        let secret = Credential::Embedded(url.trim_end_matches('/').to_string());
        Self {
            executor: RequestExecutor::with_config(url, secret, JsonRpcPolicy, config),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a client from `ETH_RPC_URL`.
    pub fn from_credentials(credentials: &Credentials) -> Result<Self> {
        Ok(Self::new(credentials.require_eth_rpc_url()?))
    }

    /// Replace the clock used for retry backoff.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.executor = self.executor.with_clock(clock);
        self
    }

    /// Send one JSON-RPC request and return its `result`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut response = self
            .executor
            .execute(&ApiRequest::post("").json(body))
            .await?;
        response
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| {
                ChainError::Rpc(ApiError::Decode {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("{} response has no result", method),
                })
            })
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        debug!("eth_call {} {}", to, data);
        let result = self
            .request("eth_call", json!([{"to": to, "data": data}, "latest"]))
            .await?;

        let hex = result.as_str().ok_or_else(|| ChainError::Abi {
            function: "eth_call",
            message: format!("expected hex string, got {}", result),
        })?;
        Bytes::from_str(hex).map_err(|e| ChainError::Abi {
            function: "eth_call",
            message: e.to_string(),
        })
    }
}
