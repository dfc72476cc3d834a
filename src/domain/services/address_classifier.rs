//! Wallet vs. contract classification from on-chain code presence

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::domain::models::AddressKind;
use crate::infrastructure::rpc::types::Block;
use crate::infrastructure::rpc::ChainClient;
use crate::utils::encoding::is_valid_address;

/// In-flight cap for concurrent eth_getCode calls
const CLASSIFY_CONCURRENCY: usize = 15;

/// Classifies addresses by probing for deployed bytecode
pub struct AddressClassifier {
    chain: Arc<dyn ChainClient>,
}

impl AddressClassifier {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    /// Classify a single address. An RPC failure degrades to Unknown so the
    /// maintenance pass can retry later.
    pub async fn classify(&self, address: &str) -> AddressKind {
        match self.chain.get_code(address).await {
            Ok(code) => Self::kind_from_code(&code),
            Err(_) => AddressKind::Unknown,
        }
    }

    /// Map returned bytecode to an address kind: empty code means wallet
    pub fn kind_from_code(code: &str) -> AddressKind {
        if code == "0x" || code.len() <= 2 {
            AddressKind::Wallet
        } else {
            AddressKind::Contract
        }
    }

    /// Classify a set of addresses with bounded concurrency. Individual
    /// failures degrade to Unknown; the batch itself never fails.
    pub async fn classify_batch(
        &self,
        addresses: &HashSet<String>,
    ) -> HashMap<String, AddressKind> {
        if addresses.is_empty() {
            return HashMap::new();
        }

        stream::iter(addresses.iter().cloned())
            .map(|address| async move {
                let kind = self.classify(&address).await;
                (address, kind)
            })
            .buffer_unordered(CLASSIFY_CONCURRENCY)
            .collect::<HashMap<_, _>>()
            .await
    }

    /// Collect every from/to participant of a block, lower-cased and checked
    /// for address shape. A null `to` (contract creation) contributes no
    /// address but the transaction still counts.
    pub fn extract_from_block(block: &Block) -> (HashSet<String>, usize) {
        let mut addresses = HashSet::new();

        for tx in &block.transactions {
            for participant in [&tx.from, &tx.to] {
                if let Some(address) = participant {
                    if is_valid_address(address) {
                        addresses.insert(address.to_lowercase());
                    }
                }
            }
        }

        (addresses, block.transactions.len())
    }

    /// Count classifications per kind for logging
    pub fn count_by_kind(kinds: &HashMap<String, AddressKind>) -> (usize, usize, usize) {
        let mut wallets = 0;
        let mut contracts = 0;
        let mut unknown = 0;
        for kind in kinds.values() {
            match kind {
                AddressKind::Wallet => wallets += 1,
                AddressKind::Contract => contracts += 1,
                AddressKind::Unknown => unknown += 1,
            }
        }
        (wallets, contracts, unknown)
    }
}
