//! In-memory chain and store fakes shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use hyperevm_indexer::domain::models::{
    AddressKind, HoldingBalance, ScanProgressUpdate, SlotActivity, TokenInfo,
};
use hyperevm_indexer::domain::store::IndexerStore;
use hyperevm_indexer::infrastructure::persistence::DbError;
use hyperevm_indexer::infrastructure::rpc::{
    Block, BlockTransaction, ChainClient, RpcError, TxReceipt,
};

/// Scripted chain backend
#[derive(Default)]
pub struct MockChain {
    latest: Mutex<u64>,
    head_down: Mutex<bool>,
    blocks: Mutex<HashMap<u64, Block>>,
    failing_blocks: Mutex<HashSet<u64>>,
    code: Mutex<HashMap<String, String>>,
    calls: Mutex<HashMap<(String, String), String>>,
    failing_calls: Mutex<HashSet<String>>,
    receipts: Mutex<HashMap<String, TxReceipt>>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_latest(&self, number: u64) {
        *self.latest.lock().unwrap() = number;
    }

    pub fn add_block(&self, number: u64, timestamp: u64, transactions: Vec<BlockTransaction>) {
        let block = Block {
            number: format!("0x{:x}", number),
            timestamp: format!("0x{:x}", timestamp),
            transactions,
        };
        self.blocks.lock().unwrap().insert(number, block);
        let mut latest = self.latest.lock().unwrap();
        if number > *latest {
            *latest = number;
        }
    }

    pub fn fail_head(&self) {
        *self.head_down.lock().unwrap() = true;
    }

    pub fn restore_head(&self) {
        *self.head_down.lock().unwrap() = false;
    }

    pub fn fail_block(&self, number: u64) {
        self.failing_blocks.lock().unwrap().insert(number);
    }

    pub fn unfail_block(&self, number: u64) {
        self.failing_blocks.lock().unwrap().remove(&number);
    }

    pub fn set_code(&self, address: &str, code: &str) {
        self.code
            .lock()
            .unwrap()
            .insert(address.to_string(), code.to_string());
    }

    pub fn set_call(&self, to: &str, data: &str, result: &str) {
        self.calls
            .lock()
            .unwrap()
            .insert((to.to_string(), data.to_string()), result.to_string());
    }

    pub fn fail_calls_to(&self, to: &str) {
        self.failing_calls.lock().unwrap().insert(to.to_string());
    }

    pub fn restore_calls_to(&self, to: &str) {
        self.failing_calls.lock().unwrap().remove(to);
    }

    pub fn set_receipt(&self, tx_hash: &str, contract_address: Option<&str>) {
        self.receipts.lock().unwrap().insert(
            tx_hash.to_string(),
            TxReceipt {
                contract_address: contract_address.map(|a| a.to_string()),
            },
        );
    }
}

/// Transaction between two addresses
pub fn tx(hash: &str, from: &str, to: &str) -> BlockTransaction {
    BlockTransaction {
        hash: hash.to_string(),
        from: Some(from.to_string()),
        to: Some(to.to_string()),
    }
}

/// Contract-creation transaction (no recipient)
pub fn creation_tx(hash: &str, from: &str) -> BlockTransaction {
    BlockTransaction {
        hash: hash.to_string(),
        from: Some(from.to_string()),
        to: None,
    }
}

/// ABI-encode a string the way an ERC-20 name()/symbol() call returns it
pub fn encode_abi_string(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut padded = bytes.to_vec();
    while padded.len() % 32 != 0 || padded.is_empty() {
        padded.push(0);
    }
    format!(
        "0x{:064x}{:064x}{}",
        0x20,
        bytes.len(),
        hex::encode(&padded)
    )
}

/// ABI-encode an unsigned integer word
pub fn encode_abi_uint(value: u128) -> String {
    format!("0x{:064x}", value)
}

#[async_trait]
impl ChainClient for MockChain {
    async fn get_latest_block(&self) -> Result<u64, RpcError> {
        if *self.head_down.lock().unwrap() {
            return Err(RpcError::Timeout);
        }
        Ok(*self.latest.lock().unwrap())
    }

    async fn get_block(&self, number: u64) -> Result<Option<Block>, RpcError> {
        if self.failing_blocks.lock().unwrap().contains(&number) {
            return Err(RpcError::Timeout);
        }
        Ok(self.blocks.lock().unwrap().get(&number).cloned())
    }

    async fn get_code(&self, address: &str) -> Result<String, RpcError> {
        Ok(self
            .code
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_else(|| "0x".to_string()))
    }

    async fn call_contract(&self, to: &str, data: &str) -> Result<String, RpcError> {
        if self.failing_calls.lock().unwrap().contains(to) {
            return Err(RpcError::Timeout);
        }
        Ok(self
            .calls
            .lock()
            .unwrap()
            .get(&(to.to_string(), data.to_string()))
            .cloned()
            .unwrap_or_else(|| "0x".to_string()))
    }

    async fn get_transaction_receipt(&self, tx_hash: &str) -> Result<Option<TxReceipt>, RpcError> {
        Ok(self.receipts.lock().unwrap().get(tx_hash).cloned())
    }
}

#[derive(Clone)]
struct StoredAddress {
    kind: AddressKind,
    last_block: u64,
    last_timestamp: u64,
}

#[derive(Clone)]
struct StoredToken {
    info: TokenInfo,
    status: String,
    retried: bool,
}

#[derive(Default)]
struct StoreInner {
    checkpoint_block: Option<u64>,
    endpoint_url: Option<String>,
    addresses: HashMap<String, StoredAddress>,
    tokens: HashMap<String, StoredToken>,
    token_order: Vec<String>,
    retries: Vec<String>,
    activity: HashMap<(String, String), (usize, u64)>,
    holdings: HashMap<String, HashMap<String, HoldingBalance>>,
    progress: Vec<ScanProgressUpdate>,
}

/// In-memory store mirroring the relational backend's semantics
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoint(&self) -> Option<u64> {
        self.inner.lock().unwrap().checkpoint_block
    }

    pub fn endpoint_url(&self) -> Option<String> {
        self.inner.lock().unwrap().endpoint_url.clone()
    }

    pub fn address_kind(&self, address: &str) -> Option<AddressKind> {
        self.inner
            .lock()
            .unwrap()
            .addresses
            .get(address)
            .map(|a| a.kind)
    }

    pub fn address_activity(&self, address: &str) -> Option<(u64, u64)> {
        self.inner
            .lock()
            .unwrap()
            .addresses
            .get(address)
            .map(|a| (a.last_block, a.last_timestamp))
    }

    pub fn token_info(&self, address: &str) -> Option<TokenInfo> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .get(address)
            .map(|t| t.info.clone())
    }

    pub fn token_status(&self, address: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .tokens
            .get(address)
            .map(|t| t.status.clone())
    }

    pub fn activity_slot(&self, date: &str, slot: &str) -> Option<(usize, u64)> {
        self.inner
            .lock()
            .unwrap()
            .activity
            .get(&(date.to_string(), slot.to_string()))
            .copied()
    }

    pub fn holdings_of(&self, wallet: &str) -> HashMap<String, HoldingBalance> {
        self.inner
            .lock()
            .unwrap()
            .holdings
            .get(wallet)
            .cloned()
            .unwrap_or_default()
    }

    pub fn progress_log(&self) -> Vec<ScanProgressUpdate> {
        self.inner.lock().unwrap().progress.clone()
    }

    pub fn retry_log(&self) -> Vec<String> {
        self.inner.lock().unwrap().retries.clone()
    }
}

#[async_trait]
impl IndexerStore for MemoryStore {
    async fn get_checkpoint(&self) -> Result<(Option<u64>, Option<String>), DbError> {
        let inner = self.inner.lock().unwrap();
        Ok((inner.checkpoint_block, inner.endpoint_url.clone()))
    }

    async fn save_checkpoint(
        &self,
        block: u64,
        endpoint_url: Option<&str>,
    ) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        let current = inner.checkpoint_block.unwrap_or(0);
        inner.checkpoint_block = Some(current.max(block));
        if let Some(url) = endpoint_url {
            inner.endpoint_url = Some(url.to_string());
        }
        Ok(())
    }

    async fn save_endpoint_choice(&self, url: &str) -> Result<(), DbError> {
        self.inner.lock().unwrap().endpoint_url = Some(url.to_string());
        Ok(())
    }

    async fn filter_unseen(
        &self,
        addresses: &HashSet<String>,
    ) -> Result<HashSet<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(addresses
            .iter()
            .filter(|a| {
                inner
                    .addresses
                    .get(*a)
                    .map(|stored| stored.kind == AddressKind::Unknown)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn save_addresses(
        &self,
        kinds: &HashMap<String, AddressKind>,
        block: u64,
        timestamp: u64,
    ) -> Result<usize, DbError> {
        let mut inner = self.inner.lock().unwrap();
        for (address, kind) in kinds {
            let entry = inner
                .addresses
                .entry(address.clone())
                .or_insert(StoredAddress {
                    kind: *kind,
                    last_block: block,
                    last_timestamp: timestamp,
                });
            if *kind != AddressKind::Unknown {
                entry.kind = *kind;
            }
            entry.last_block = block;
            entry.last_timestamp = timestamp;
        }
        Ok(kinds.len())
    }

    async fn save_tokens(&self, tokens: &HashMap<String, TokenInfo>) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        for (address, info) in tokens {
            if !inner.tokens.contains_key(address) {
                inner.token_order.push(address.clone());
            }
            inner.tokens.insert(
                address.clone(),
                StoredToken {
                    info: info.clone(),
                    status: "detected".to_string(),
                    retried: false,
                },
            );
        }
        Ok(())
    }

    async fn mark_tokens_failed(&self, addresses: &[String]) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        for address in addresses {
            if inner.tokens.contains_key(address) {
                continue;
            }
            inner.token_order.push(address.clone());
            inner.tokens.insert(
                address.clone(),
                StoredToken {
                    info: TokenInfo {
                        name: String::new(),
                        symbol: String::new(),
                        decimals: 0,
                        total_supply: "0".to_string(),
                        creator: "Unknown".to_string(),
                    },
                    status: "failed".to_string(),
                    retried: false,
                },
            );
        }
        Ok(())
    }

    async fn get_unknown_addresses(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        let mut unknown: Vec<(&String, &StoredAddress)> = inner
            .addresses
            .iter()
            .filter(|(_, a)| a.kind == AddressKind::Unknown)
            .collect();
        unknown.sort_by_key(|(_, a)| a.last_block);
        Ok(unknown
            .into_iter()
            .take(limit as usize)
            .map(|(address, _)| address.clone())
            .collect())
    }

    async fn update_address_kinds(
        &self,
        kinds: &HashMap<String, AddressKind>,
    ) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        for (address, kind) in kinds {
            if let Some(stored) = inner.addresses.get_mut(address) {
                stored.kind = *kind;
            }
        }
        Ok(())
    }

    async fn get_failed_tokens(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .token_order
            .iter()
            .filter(|address| {
                inner
                    .tokens
                    .get(*address)
                    .map(|t| t.status == "failed" && !t.retried)
                    .unwrap_or(false)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn mark_token_retry(&self, address: &str) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        inner.retries.push(address.to_string());
        if let Some(token) = inner.tokens.get_mut(address) {
            token.retried = true;
        }
        Ok(())
    }

    async fn save_activity_slots(
        &self,
        slots: &HashMap<(String, String), SlotActivity>,
    ) -> Result<(), DbError> {
        let mut inner = self.inner.lock().unwrap();
        for (key, slot) in slots {
            inner
                .activity
                .insert(key.clone(), (slot.addresses.len(), slot.transactions));
        }
        Ok(())
    }

    async fn get_recent_tokens(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .token_order
            .iter()
            .rev()
            .filter(|address| {
                inner
                    .tokens
                    .get(*address)
                    .map(|t| t.status == "detected")
                    .unwrap_or(false)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_token(&self, address: &str) -> Result<Option<TokenInfo>, DbError> {
        Ok(self.token_info(address))
    }

    async fn count_wallets(&self) -> Result<u64, DbError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .addresses
            .values()
            .filter(|a| a.kind == AddressKind::Wallet)
            .count() as u64)
    }

    async fn get_wallets_for_scan(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, DbError> {
        let inner = self.inner.lock().unwrap();
        let mut wallets: Vec<(&String, &StoredAddress)> = inner
            .addresses
            .iter()
            .filter(|(_, a)| a.kind == AddressKind::Wallet)
            .collect();
        wallets.sort_by(|a, b| b.1.last_block.cmp(&a.1.last_block).then(a.0.cmp(b.0)));
        Ok(wallets
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(address, _)| address.clone())
            .collect())
    }

    async fn save_wallet_holdings(
        &self,
        wallet: &str,
        holdings: &HashMap<String, HoldingBalance>,
    ) -> Result<(), DbError> {
        self.inner
            .lock()
            .unwrap()
            .holdings
            .insert(wallet.to_string(), holdings.clone());
        Ok(())
    }

    async fn update_scan_progress(&self, update: ScanProgressUpdate) -> Result<(), DbError> {
        self.inner.lock().unwrap().progress.push(update);
        Ok(())
    }
}
