//! JSON-RPC client with automatic endpoint fallback

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::RpcConfig;
use crate::infrastructure::rpc::error::RpcError;
use crate::infrastructure::rpc::rotator::EndpointRotator;
use crate::infrastructure::rpc::types::{Block, TxReceipt};
use crate::utils::encoding::safe_hex_to_u64;
use crate::utils::logging;

/// Provider-specific marker for an exhausted historical-data quota
const QUOTA_ERROR_MARKER: &str = "archived blocks";

/// Typed access to the chain, decoded once at this boundary
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Latest block number known to the active endpoint
    async fn get_latest_block(&self) -> Result<u64, RpcError>;
    /// Full block with transactions; None when the chain has no such block
    async fn get_block(&self, number: u64) -> Result<Option<Block>, RpcError>;
    /// Deployed bytecode at an address ("0x" for plain wallets)
    async fn get_code(&self, address: &str) -> Result<String, RpcError>;
    /// Read-only eth_call against a contract
    async fn call_contract(&self, to: &str, data: &str) -> Result<String, RpcError>;
    /// Receipt of a mined transaction; None when unknown
    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError>;
}

/// JSON-RPC client bound to the rotator's active endpoint. Transport and
/// timeout failures are retried at most once more after a forced rotation;
/// quota exhaustion hops to the next endpoint without consuming the retry
/// budget.
pub struct RpcClient {
    rotator: Arc<EndpointRotator>,
    config: RpcConfig,
    http: Client,
    request_id: AtomicU64,
}

impl RpcClient {
    pub fn new(rotator: Arc<EndpointRotator>, config: RpcConfig) -> Self {
        Self {
            rotator,
            config,
            http: Client::new(),
            request_id: AtomicU64::new(1),
        }
    }

    /// Issue a JSON-RPC call against the active endpoint
    pub async fn call(
        &self,
        method: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, RpcError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": self.request_id.fetch_add(1, Ordering::Relaxed)
        });

        let max_attempts = 2u32;
        let mut attempts = 0u32;
        let mut quota_hops = 0usize;
        let mut last_error = RpcError::NoEndpoint;

        while attempts < max_attempts {
            let endpoint = match self.rotator.active().await {
                Some(endpoint) => endpoint,
                None => {
                    if !self.rotator.rotate(true).await {
                        return Err(RpcError::NoEndpoint);
                    }
                    match self.rotator.active().await {
                        Some(endpoint) => endpoint,
                        None => return Err(RpcError::NoEndpoint),
                    }
                }
            };

            match self.send(&endpoint.url, &payload, timeout).await {
                Ok(body) => {
                    if let Some(error) = body.get("error") {
                        let message = error
                            .get("message")
                            .and_then(|m| m.as_str())
                            .unwrap_or("unknown provider error")
                            .to_string();

                        if message.contains(QUOTA_ERROR_MARKER) {
                            // Historical-data quota burned through on this
                            // provider; hop endpoints without spending an
                            // attempt, bounded by the endpoint count.
                            logging::log_warning(&format!(
                                "Quota exhausted on {}",
                                endpoint.name
                            ));
                            self.rotator.clear_active().await;
                            quota_hops += 1;
                            if quota_hops <= self.rotator.endpoint_count() {
                                continue;
                            }
                            return Err(RpcError::Provider(message));
                        }

                        return Err(RpcError::Provider(message));
                    }

                    self.rotator.reset_failures(&endpoint.url).await;
                    return Ok(body.get("result").cloned().unwrap_or(Value::Null));
                }
                Err(e) => {
                    attempts += 1;
                    self.rotator.record_failure(&endpoint.url).await;
                    last_error = e;
                    if attempts < max_attempts {
                        self.rotator.rotate(true).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn send(
        &self,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<Value, RpcError> {
        let response = self
            .http
            .post(url)
            .json(payload)
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RpcError::Http(format!("HTTP {}", response.status())));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;
        Ok(body)
    }

    fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.config.token_timeout_secs)
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn get_latest_block(&self) -> Result<u64, RpcError> {
        let result = self
            .call("eth_blockNumber", json!([]), self.default_timeout())
            .await?;
        Ok(result.as_str().map(safe_hex_to_u64).unwrap_or(0))
    }

    async fn get_block(&self, number: u64) -> Result<Option<Block>, RpcError> {
        let params = json!([format!("0x{:x}", number), true]);
        let result = self
            .call("eth_getBlockByNumber", params, self.default_timeout())
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        serde_json::from_value::<Block>(result)
            .map(Some)
            .map_err(|e| RpcError::Decode(e.to_string()))
    }

    async fn get_code(&self, address: &str) -> Result<String, RpcError> {
        let result = self
            .call("eth_getCode", json!([address, "latest"]), self.default_timeout())
            .await?;
        Ok(result.as_str().unwrap_or("0x").to_string())
    }

    async fn call_contract(&self, to: &str, data: &str) -> Result<String, RpcError> {
        let params = json!([{"to": to, "data": data}, "latest"]);
        let result = self.call("eth_call", params, self.token_timeout()).await?;
        Ok(result.as_str().unwrap_or("0x").to_string())
    }

    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError> {
        let result = self
            .call(
                "eth_getTransactionReceipt",
                json!([tx_hash]),
                self.default_timeout(),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        serde_json::from_value::<TxReceipt>(result)
            .map(Some)
            .map_err(|e| RpcError::Decode(e.to_string()))
    }
}
