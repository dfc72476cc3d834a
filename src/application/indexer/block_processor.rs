//! Batch processing of block ranges: address extraction, classification,
//! token detection and activity bucketing

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::IndexerConfig;
use crate::domain::errors::IndexerError;
use crate::domain::models::{AddressKind, SlotActivity};
use crate::domain::services::{AddressClassifier, TokenDetector};
use crate::domain::store::IndexerStore;
use crate::infrastructure::rpc::ChainClient;
use crate::utils::logging;
use crate::utils::time::{date_from_timestamp, time_slot};

/// Counters reported after a processed batch
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub blocks: u64,
    pub transactions: usize,
    pub addresses: usize,
    pub new_wallets: usize,
    pub new_contracts: usize,
    pub new_tokens: usize,
}

/// Processes contiguous block ranges against the chain and the store
pub struct BlockProcessor {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn IndexerStore>,
    classifier: AddressClassifier,
    detector: TokenDetector,
    config: IndexerConfig,
}

impl BlockProcessor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn IndexerStore>,
        config: IndexerConfig,
    ) -> Self {
        let classifier = AddressClassifier::new(chain.clone());
        let detector = TokenDetector::new(
            chain.clone(),
            config.creator_search_blocks,
            config.creator_search_step,
        );
        Self {
            chain,
            store,
            classifier,
            detector,
            config,
        }
    }

    /// Process the inclusive block range `start..=end` as one unit.
    ///
    /// Blocks are fetched in parallel. A block that fails to fetch or that
    /// the chain reports as missing is skipped; the stats reflect the blocks
    /// that did arrive.
    pub async fn process_batch(&self, start: u64, end: u64) -> Result<BatchSummary, IndexerError> {
        let mut participants: HashSet<String> = HashSet::new();
        let mut slots: HashMap<(String, String), SlotActivity> = HashMap::new();
        let mut transactions = 0usize;
        let mut last_timestamp = 0u64;
        let mut blocks = 0u64;

        let fetched = futures::future::join_all(
            (start..=end).map(|number| async move { (number, self.chain.get_block(number).await) }),
        )
        .await;

        for (number, result) in fetched {
            let block = match result {
                Ok(Some(block)) => block,
                Ok(None) => {
                    logging::log_debug(&format!("Block {} not available, skipping", number));
                    continue;
                }
                Err(e) => {
                    logging::log_warning(&format!("Failed to fetch block {}: {}", number, e));
                    continue;
                }
            };

            let timestamp = block.timestamp();
            let (block_addresses, tx_count) = AddressClassifier::extract_from_block(&block);

            if tx_count > 0 && timestamp > 0 {
                let key = (date_from_timestamp(timestamp), time_slot(timestamp));
                let slot = slots.entry(key).or_default();
                slot.addresses.extend(block_addresses.iter().cloned());
                slot.transactions += tx_count as u64;
            }

            participants.extend(block_addresses);
            transactions += tx_count;
            if timestamp > 0 {
                last_timestamp = timestamp;
            }
            blocks += 1;
        }

        let mut summary = BatchSummary {
            blocks,
            transactions,
            addresses: participants.len(),
            ..Default::default()
        };

        if participants.is_empty() {
            return Ok(summary);
        }

        // Only addresses without a settled type burn eth_getCode calls; the
        // rest are re-stamped with fresh activity below.
        let unseen = self.store.filter_unseen(&participants).await?;
        let classified = self.classifier.classify_batch(&unseen).await;

        let (wallets, contracts, unknown) = AddressClassifier::count_by_kind(&classified);
        summary.new_wallets = wallets;
        summary.new_contracts = contracts;

        let mut kinds: HashMap<String, AddressKind> = HashMap::with_capacity(participants.len());
        for address in &participants {
            let kind = classified
                .get(address)
                .copied()
                .unwrap_or(AddressKind::Unknown);
            kinds.insert(address.clone(), kind);
        }

        self.store
            .save_addresses(&kinds, end, last_timestamp)
            .await?;

        if unknown > 0 {
            logging::log_debug(&format!(
                "{} addresses left unknown for the maintenance pass",
                unknown
            ));
        }

        let new_contracts: Vec<String> = classified
            .iter()
            .filter(|(_, kind)| **kind == AddressKind::Contract)
            .map(|(address, _)| address.clone())
            .collect();

        if !new_contracts.is_empty() {
            let outcome = self.detector.detect_batch(&new_contracts, end).await;
            summary.new_tokens = outcome.tokens.len();

            if !outcome.tokens.is_empty() {
                for (address, info) in &outcome.tokens {
                    logging::log_info(&format!(
                        "Token detected: {} ({}) at {}",
                        info.name, info.symbol, address
                    ));
                }
                self.store.save_tokens(&outcome.tokens).await?;
            }
            if !outcome.failed.is_empty() {
                self.store.mark_tokens_failed(&outcome.failed).await?;
            }
        }

        if !slots.is_empty() {
            self.store.save_activity_slots(&slots).await?;
        }

        Ok(summary)
    }

    /// Maintenance: re-classify addresses still stored as unknown.
    /// Returns how many were resolved.
    pub async fn update_unknown_kinds(&self) -> Result<usize, IndexerError> {
        let unknown = self
            .store
            .get_unknown_addresses(self.config.unknown_batch_limit)
            .await?;
        if unknown.is_empty() {
            return Ok(0);
        }

        let candidates: HashSet<String> = unknown.into_iter().collect();
        let classified = self.classifier.classify_batch(&candidates).await;

        let resolved: HashMap<String, AddressKind> = classified
            .into_iter()
            .filter(|(_, kind)| *kind != AddressKind::Unknown)
            .collect();

        if resolved.is_empty() {
            return Ok(0);
        }

        self.store.update_address_kinds(&resolved).await?;
        logging::log_info(&format!(
            "Maintenance resolved {} previously unknown addresses",
            resolved.len()
        ));
        Ok(resolved.len())
    }

    /// Maintenance: retry metadata probes for tokens that failed earlier.
    /// Every eligible token gets its retry stamped whether or not it succeeds,
    /// which enforces the one-hour gate between attempts.
    pub async fn retry_failed_tokens(&self, current_block: u64) -> Result<usize, IndexerError> {
        let failed = self
            .store
            .get_failed_tokens(self.config.failed_token_limit)
            .await?;
        if failed.is_empty() {
            return Ok(0);
        }

        let mut recovered = 0usize;
        for address in failed {
            self.store.mark_token_retry(&address).await?;

            if let Some(info) = self.detector.retry(&address, current_block).await {
                let mut tokens = HashMap::new();
                logging::log_info(&format!(
                    "Recovered token metadata: {} ({}) at {}",
                    info.name, info.symbol, address
                ));
                tokens.insert(address, info);
                self.store.save_tokens(&tokens).await?;
                recovered += 1;
            }
        }

        Ok(recovered)
    }
}
