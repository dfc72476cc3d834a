//! Endpoint records and liveness probe results

pub use crate::config::EndpointConfig as Endpoint;

/// Outcome of a single endpoint liveness test. Never an error: unreachable
/// endpoints are a normal state, not a failure of the prober.
#[derive(Debug, Clone)]
pub struct EndpointProbe {
    /// Whether the endpoint answered eth_blockNumber in time
    pub reachable: bool,
    /// Head block reported by the endpoint (0 when unreachable)
    pub latest_block: u64,
    /// Round-trip latency in seconds (the test timeout when unreachable)
    pub latency: f64,
    /// Error text when unreachable
    pub error: Option<String>,
}

impl EndpointProbe {
    pub fn reachable(latest_block: u64, latency: f64) -> Self {
        Self {
            reachable: true,
            latest_block,
            latency,
            error: None,
        }
    }

    pub fn unreachable(error: String, latency: f64) -> Self {
        Self {
            reachable: false,
            latest_block: 0,
            latency,
            error: Some(error),
        }
    }
}

/// Pick the best endpoint out of a probed set: reachable only, minimum by
/// (priority ascending, latency ascending). Pure so it can be tested without
/// a network.
pub fn pick_best(results: Vec<(Endpoint, EndpointProbe)>) -> Option<(Endpoint, EndpointProbe)> {
    results
        .into_iter()
        .filter(|(_, probe)| probe.reachable)
        .min_by(|(a, pa), (b, pb)| {
            a.priority
                .cmp(&b.priority)
                .then(pa.latency.total_cmp(&pb.latency))
        })
}

/// Snapshot of the rotator state exposed to the status surface
#[derive(Debug, Clone)]
pub struct EndpointInfo {
    /// Name of the active endpoint, empty when none
    pub name: String,
    /// URL of the active endpoint, "None" when none
    pub url: String,
    /// Consecutive failures recorded against the active endpoint
    pub failures: u32,
}
