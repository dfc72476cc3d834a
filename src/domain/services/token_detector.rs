//! ERC-20 token detection: read-function probes and creator lookup

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::domain::models::TokenInfo;
use crate::infrastructure::rpc::error::RpcError;
use crate::infrastructure::rpc::ChainClient;
use crate::utils::encoding::{decode_abi_string, hex_to_decimal_string, safe_hex_to_u64};
use crate::utils::logging;

/// 4-byte selectors of the canonical ERC-20 read functions
pub const SELECTOR_NAME: &str = "0x06fdde03";
pub const SELECTOR_SYMBOL: &str = "0x95d89b41";
pub const SELECTOR_DECIMALS: &str = "0x313ce567";
pub const SELECTOR_TOTAL_SUPPLY: &str = "0x18160ddd";
/// balanceOf(address), used by the wallet scanner
pub const SELECTOR_BALANCE_OF: &str = "0x70a08231";

/// In-flight cap for concurrent token probes
const DETECT_CONCURRENCY: usize = 10;

/// Outcome of a batch detection run
#[derive(Debug, Default)]
pub struct DetectionOutcome {
    /// Contracts that answered all four probes
    pub tokens: HashMap<String, TokenInfo>,
    /// Contracts whose probe failed transiently (retried later)
    pub failed: Vec<String>,
}

/// Probes contracts for the four canonical ERC-20 read functions and locates
/// creators by scanning recent contract-creation transactions backward
pub struct TokenDetector {
    chain: Arc<dyn ChainClient>,
    search_blocks: u64,
    search_step: u64,
}

impl TokenDetector {
    pub fn new(chain: Arc<dyn ChainClient>, search_blocks: u64, search_step: u64) -> Self {
        Self {
            chain,
            search_blocks,
            search_step: search_step.max(1),
        }
    }

    /// Probe a contract for the four ERC-20 read functions.
    ///
    /// Ok(None) means the contract answered but is not a token (any empty
    /// response disqualifies it). Err means the chain was unreachable and the
    /// contract is worth retrying.
    pub async fn probe(&self, contract: &str) -> Result<Option<TokenInfo>, RpcError> {
        let name_data = self.chain.call_contract(contract, SELECTOR_NAME).await?;
        if is_empty_result(&name_data) {
            return Ok(None);
        }

        let symbol_data = self.chain.call_contract(contract, SELECTOR_SYMBOL).await?;
        if is_empty_result(&symbol_data) {
            return Ok(None);
        }

        let decimals_data = self.chain.call_contract(contract, SELECTOR_DECIMALS).await?;
        if is_empty_result(&decimals_data) {
            return Ok(None);
        }

        let supply_data = self
            .chain
            .call_contract(contract, SELECTOR_TOTAL_SUPPLY)
            .await?;
        if is_empty_result(&supply_data) {
            return Ok(None);
        }

        Ok(Some(TokenInfo {
            name: decode_abi_string(&name_data),
            symbol: decode_abi_string(&symbol_data),
            decimals: safe_hex_to_u64(&decimals_data) as u32,
            total_supply: hex_to_decimal_string(&supply_data),
            creator: "Unknown".to_string(),
        }))
    }

    /// Scan backward from `from_block` for the transaction that created the
    /// contract. Per-block failures are swallowed; "Unknown" when the search
    /// window is exhausted.
    pub async fn find_creator(&self, contract: &str, from_block: u64) -> String {
        let contract_lower = contract.to_lowercase();
        let search_start = from_block.saturating_sub(self.search_blocks).max(1);

        let mut block_number = from_block;
        while block_number >= search_start {
            if let Ok(Some(block)) = self.chain.get_block(block_number).await {
                for tx in &block.transactions {
                    if !tx.is_contract_creation() {
                        continue;
                    }
                    let receipt = match self.chain.get_transaction_receipt(&tx.hash).await {
                        Ok(Some(receipt)) => receipt,
                        _ => continue,
                    };
                    let created = receipt
                        .contract_address
                        .as_deref()
                        .map(|a| a.to_lowercase())
                        .unwrap_or_default();
                    if created == contract_lower {
                        return tx.from.clone().unwrap_or_else(|| "Unknown".to_string());
                    }
                }
            }

            if block_number < search_start + self.search_step {
                break;
            }
            block_number -= self.search_step;
        }

        "Unknown".to_string()
    }

    /// Probe a batch of contracts with bounded concurrency, resolving the
    /// creator for each positive. Non-tokens are omitted; transient failures
    /// are reported separately for the failed-token retry path.
    pub async fn detect_batch(&self, contracts: &[String], current_block: u64) -> DetectionOutcome {
        if contracts.is_empty() {
            return DetectionOutcome::default();
        }

        let results: Vec<(String, Result<Option<TokenInfo>, RpcError>)> =
            stream::iter(contracts.iter().cloned())
                .map(|address| async move {
                    let probed = self.probe(&address).await;
                    let probed = match probed {
                        Ok(Some(mut info)) => {
                            info.creator = self.find_creator(&address, current_block).await;
                            Ok(Some(info))
                        }
                        other => other,
                    };
                    (address, probed)
                })
                .buffer_unordered(DETECT_CONCURRENCY)
                .collect()
                .await;

        let mut outcome = DetectionOutcome::default();
        for (address, result) in results {
            match result {
                Ok(Some(info)) => {
                    outcome.tokens.insert(address, info);
                }
                Ok(None) => {}
                Err(e) => {
                    logging::log_debug(&format!("Token probe failed for {}: {}", address, e));
                    outcome.failed.push(address);
                }
            }
        }

        outcome
    }

    /// Re-run probe and creator lookup for a previously failed contract
    pub async fn retry(&self, address: &str, current_block: u64) -> Option<TokenInfo> {
        match self.probe(address).await {
            Ok(Some(mut info)) => {
                info.creator = self.find_creator(address, current_block).await;
                Some(info)
            }
            _ => None,
        }
    }
}

fn is_empty_result(data: &str) -> bool {
    data.is_empty() || data == "0x"
}
