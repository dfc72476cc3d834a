//! Continuous chain monitoring: resume from the checkpoint, ingest batches,
//! and run the periodic maintenance passes

use std::sync::Arc;
use std::time::Duration;

use crate::config::IndexerConfig;
use crate::domain::errors::IndexerError;
use crate::domain::store::IndexerStore;
use crate::infrastructure::rpc::{ChainClient, EndpointRotator};
use crate::utils::logging;

use super::block_processor::BlockProcessor;

/// Drives the ingestion loop against the chain head
pub struct ChainMonitor {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn IndexerStore>,
    rotator: Arc<EndpointRotator>,
    processor: BlockProcessor,
    config: IndexerConfig,
}

impl ChainMonitor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn IndexerStore>,
        rotator: Arc<EndpointRotator>,
        config: IndexerConfig,
    ) -> Self {
        let processor = BlockProcessor::new(chain.clone(), store.clone(), config.clone());
        Self {
            chain,
            store,
            rotator,
            processor,
            config,
        }
    }

    /// Run the monitoring loop until the task is aborted. Only a failure to
    /// read the checkpoint at startup is fatal; RPC outages, including one
    /// during a fresh deployment's first head fetch, are retried each cycle.
    pub async fn run(&self) -> Result<(), IndexerError> {
        let (mut current_block, endpoint_url) = self.store.get_checkpoint().await?;

        if let Some(url) = &endpoint_url {
            self.rotator.restore(url).await;
        }
        if !self.rotator.rotate(false).await {
            logging::log_warning("No reachable RPC endpoint yet, will keep retrying");
        }

        match current_block {
            Some(block) => logging::log_info(&format!("Resuming from block {}", block)),
            None => logging::log_info("No checkpoint found, adopting the chain head"),
        }

        let mut cycle = 0u32;

        loop {
            cycle += 1;

            if self.rotator.should_retest().await {
                self.rotator.rotate(true).await;
            }

            match self.chain.get_latest_block().await {
                Ok(latest) => match current_block {
                    // Fresh deployment: adopt the head instead of replaying
                    // the whole chain.
                    None => match self.store.save_checkpoint(latest, None).await {
                        Ok(()) => {
                            logging::log_info(&format!("First run, starting at head block {}", latest));
                            current_block = Some(latest);
                        }
                        Err(e) => {
                            logging::log_error(&format!("Failed to save initial checkpoint: {}", e));
                        }
                    },
                    Some(current) if latest > current => {
                        match self.ingest_range(current + 1, latest).await {
                            Ok(reached) => current_block = Some(reached),
                            Err(e) => {
                                logging::log_error(&format!("Batch processing failed: {}", e));
                                // A failed batch usually means the endpoint went
                                // bad mid-flight; force a fresh pick.
                                self.rotator.rotate(true).await;
                            }
                        }
                    }
                    Some(current) => {
                        logging::log_debug(&format!("No new blocks (head {})", current));
                    }
                },
                Err(e) => {
                    let info = self.rotator.current_info().await;
                    logging::log_warning(&format!(
                        "Failed to read chain head via {}: {}",
                        info.url, e
                    ));
                    self.rotator.rotate(true).await;
                }
            }

            if cycle % self.config.maintenance_interval_cycles == 0 {
                self.run_maintenance(current_block.unwrap_or(0)).await;
            }

            tokio::time::sleep(Duration::from_secs(self.config.check_interval_secs)).await;
        }
    }

    /// Ingest `start..=latest` in checkpointed batches. Returns the last
    /// block whose batch completed.
    async fn ingest_range(&self, start: u64, latest: u64) -> Result<u64, IndexerError> {
        let mut batch_start = start;
        let mut reached = start - 1;

        while batch_start <= latest {
            let batch_end = (batch_start + self.config.batch_size - 1).min(latest);

            let summary = self.processor.process_batch(batch_start, batch_end).await?;

            let endpoint_url = self.rotator.active().await.map(|e| e.url);
            self.store
                .save_checkpoint(batch_end, endpoint_url.as_deref())
                .await?;
            reached = batch_end;

            logging::log_info(&format!(
                "Blocks {}-{}: {} txs, {} addresses ({} wallets, {} contracts), {} tokens",
                batch_start,
                batch_end,
                summary.transactions,
                summary.addresses,
                summary.new_wallets,
                summary.new_contracts,
                summary.new_tokens
            ));

            batch_start = batch_end + 1;
            if batch_start <= latest {
                tokio::time::sleep(Duration::from_millis(self.config.batch_pause_ms)).await;
            }
        }

        Ok(reached)
    }

    /// Maintenance failures only log; the ingestion loop keeps running.
    async fn run_maintenance(&self, current_block: u64) {
        logging::log_debug("Running maintenance pass");

        if let Err(e) = self.processor.update_unknown_kinds().await {
            logging::log_warning(&format!("Unknown-address maintenance failed: {}", e));
        }
        if let Err(e) = self.processor.retry_failed_tokens(current_block).await {
            logging::log_warning(&format!("Failed-token maintenance failed: {}", e));
        }
    }
}
