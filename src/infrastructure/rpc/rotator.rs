//! Endpoint rotation: liveness tests, best-endpoint selection and failure
//! accounting over the configured provider list

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::RpcConfig;
use crate::domain::store::IndexerStore;
use crate::infrastructure::rpc::endpoint::{pick_best, Endpoint, EndpointInfo, EndpointProbe};
use crate::utils::encoding::safe_hex_to_u64;
use crate::utils::logging;

/// Liveness test for a single endpoint. The rotator only depends on this
/// seam, so tests can script probe outcomes without a network.
#[async_trait]
pub trait EndpointProber: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> EndpointProbe;
}

/// Default prober: one eth_blockNumber POST with the test timeout
pub struct HttpProber {
    http: Client,
    test_timeout_secs: u64,
    probe_id: AtomicU64,
}

impl HttpProber {
    pub fn new(test_timeout_secs: u64) -> Self {
        Self {
            http: Client::new(),
            test_timeout_secs,
            probe_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl EndpointProber for HttpProber {
    async fn probe(&self, endpoint: &Endpoint) -> EndpointProbe {
        let test_timeout = self.test_timeout_secs;
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "eth_blockNumber",
            "params": [],
            "id": self.probe_id.fetch_add(1, Ordering::Relaxed)
        });

        let started = Instant::now();
        let response = self
            .http
            .post(&endpoint.url)
            .json(&payload)
            .timeout(Duration::from_secs(test_timeout))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let latency = started.elapsed().as_secs_f64().min(test_timeout as f64);
                let error = if e.is_timeout() {
                    "Timeout".to_string()
                } else {
                    e.to_string()
                };
                return EndpointProbe::unreachable(error, latency);
            }
        };

        let latency = started.elapsed().as_secs_f64();

        if !response.status().is_success() {
            return EndpointProbe::unreachable(format!("HTTP {}", response.status()), latency);
        }

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => return EndpointProbe::unreachable(e.to_string(), latency),
        };

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown provider error");
            return EndpointProbe::unreachable(message.to_string(), latency);
        }

        let latest_block = body
            .get("result")
            .and_then(|r| r.as_str())
            .map(safe_hex_to_u64)
            .unwrap_or(0);

        EndpointProbe::reachable(latest_block, latency)
    }
}

#[derive(Debug, Default)]
struct RotatorState {
    active: Option<Endpoint>,
    failures: HashMap<String, u32>,
    last_test: Option<Instant>,
}

/// Holds the prioritized endpoint list and decides which provider receives
/// the traffic. The only mutable state shared between concurrent RPC calls;
/// redundant rotations triggered by racing callers are harmless.
pub struct EndpointRotator {
    endpoints: Vec<Endpoint>,
    config: RpcConfig,
    prober: Arc<dyn EndpointProber>,
    state: Mutex<RotatorState>,
    store: Option<Arc<dyn IndexerStore>>,
}

impl EndpointRotator {
    pub fn new(endpoints: Vec<Endpoint>, config: RpcConfig) -> Self {
        let prober = Arc::new(HttpProber::new(config.test_timeout_secs));
        Self {
            endpoints,
            config,
            prober,
            state: Mutex::new(RotatorState::default()),
            store: None,
        }
    }

    /// Attach the store used to persist the active endpoint choice
    pub fn with_store(mut self, store: Arc<dyn IndexerStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the liveness prober
    pub fn with_prober(mut self, prober: Arc<dyn EndpointProber>) -> Self {
        self.prober = prober;
        self
    }

    /// Number of configured endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Adopt a previously checkpointed endpoint URL if it is still configured
    pub async fn restore(&self, url: &str) {
        if let Some(endpoint) = self.endpoints.iter().find(|e| e.url == url) {
            let mut state = self.state.lock().await;
            state.active = Some(endpoint.clone());
            logging::log_info(&format!("Restored RPC endpoint: {}", endpoint.name));
        }
    }

    /// Test every configured endpoint and pick the best reachable one
    pub async fn find_best(&self) -> Option<(Endpoint, EndpointProbe)> {
        let mut results = Vec::with_capacity(self.endpoints.len());

        for endpoint in &self.endpoints {
            let probe = self.prober.probe(endpoint).await;
            if probe.reachable {
                logging::log_debug(&format!(
                    "Endpoint {} ok: block {} ({:.2}s)",
                    endpoint.name, probe.latest_block, probe.latency
                ));
            } else {
                logging::log_debug(&format!(
                    "Endpoint {} unreachable: {}",
                    endpoint.name,
                    probe.error.as_deref().unwrap_or("unknown")
                ));
            }
            results.push((endpoint.clone(), probe));
        }

        pick_best(results)
    }

    /// Switch to the best endpoint. Short-circuits when an active endpoint
    /// was tested within the retest interval and no retest is forced.
    /// Returns false only when no endpoint is reachable.
    pub async fn rotate(&self, force_retest: bool) -> bool {
        {
            let state = self.state.lock().await;
            let fresh = state
                .last_test
                .map(|t| t.elapsed() < Duration::from_secs(self.config.retest_interval_secs))
                .unwrap_or(false);
            if !force_retest && state.active.is_some() && fresh {
                return true;
            }
        }

        let best = match self.find_best().await {
            Some(best) => best,
            None => {
                logging::log_warning("No reachable RPC endpoint");
                return false;
            }
        };

        let (endpoint, probe) = best;
        let switched = {
            let mut state = self.state.lock().await;
            let switched = state
                .active
                .as_ref()
                .map(|active| active.url != endpoint.url)
                .unwrap_or(true);
            if switched {
                state.failures.remove(&endpoint.url);
                state.active = Some(endpoint.clone());
            }
            state.last_test = Some(Instant::now());
            switched
        };

        if switched {
            logging::log_info(&format!(
                "Switched RPC endpoint to {} ({:.2}s)",
                endpoint.name, probe.latency
            ));
            if let Some(store) = &self.store {
                if let Err(e) = store.save_endpoint_choice(&endpoint.url).await {
                    logging::log_error(&format!("Failed to persist endpoint choice: {}", e));
                }
            }
        }

        true
    }

    /// The currently active endpoint, if any
    pub async fn active(&self) -> Option<Endpoint> {
        self.state.lock().await.active.clone()
    }

    /// Drop the active endpoint so the next call rotates
    pub async fn clear_active(&self) {
        self.state.lock().await.active = None;
    }

    /// Record a failed call against an endpoint. Clears the active endpoint
    /// once the failure threshold is reached. Returns the new count.
    pub async fn record_failure(&self, url: &str) -> u32 {
        let mut state = self.state.lock().await;
        let count = state.failures.entry(url.to_string()).or_insert(0);
        *count += 1;
        let count = *count;

        if count >= self.config.max_failures {
            if state.active.as_ref().map(|a| a.url.as_str()) == Some(url) {
                let name = state.active.as_ref().map(|a| a.name.clone()).unwrap_or_default();
                logging::log_warning(&format!("Too many failures on {}, dropping endpoint", name));
                state.active = None;
            }
        }

        count
    }

    /// Reset the failure counter after a successful call
    pub async fn reset_failures(&self, url: &str) {
        self.state.lock().await.failures.remove(url);
    }

    /// True when the retest interval elapsed since the last full test
    pub async fn should_retest(&self) -> bool {
        let state = self.state.lock().await;
        state
            .last_test
            .map(|t| t.elapsed() > Duration::from_secs(self.config.retest_interval_secs))
            .unwrap_or(true)
    }

    /// Snapshot of the active endpoint for the status surface
    pub async fn current_info(&self) -> EndpointInfo {
        let state = self.state.lock().await;
        match &state.active {
            Some(endpoint) => EndpointInfo {
                name: endpoint.name.clone(),
                url: endpoint.url.clone(),
                failures: state.failures.get(&endpoint.url).copied().unwrap_or(0),
            },
            None => EndpointInfo {
                name: String::new(),
                url: "None".to_string(),
                failures: 0,
            },
        }
    }
}
