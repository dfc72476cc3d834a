//! SeaORM-backed implementation of the storage contract

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::models::{
    AddressKind, HoldingBalance, ScanProgressUpdate, SlotActivity, TokenInfo,
};
use crate::domain::store::IndexerStore;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::repositories::Repositories;

/// Storage backend delegating to the SeaORM repositories
pub struct SqlStore {
    repos: Repositories,
}

impl SqlStore {
    /// Create a new SqlStore
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl IndexerStore for SqlStore {
    async fn get_checkpoint(&self) -> Result<(Option<u64>, Option<String>), DbError> {
        self.repos.checkpoint.get().await
    }

    async fn save_checkpoint(
        &self,
        block: u64,
        endpoint_url: Option<&str>,
    ) -> Result<(), DbError> {
        self.repos.checkpoint.save(block, endpoint_url).await
    }

    async fn save_endpoint_choice(&self, url: &str) -> Result<(), DbError> {
        self.repos.checkpoint.save_endpoint(url).await
    }

    async fn filter_unseen(
        &self,
        addresses: &HashSet<String>,
    ) -> Result<HashSet<String>, DbError> {
        self.repos.address.filter_unseen(addresses).await
    }

    async fn save_addresses(
        &self,
        kinds: &HashMap<String, AddressKind>,
        block: u64,
        timestamp: u64,
    ) -> Result<usize, DbError> {
        self.repos.address.save_batch(kinds, block, timestamp).await
    }

    async fn save_tokens(&self, tokens: &HashMap<String, TokenInfo>) -> Result<(), DbError> {
        self.repos.token.save_detected(tokens).await
    }

    async fn mark_tokens_failed(&self, addresses: &[String]) -> Result<(), DbError> {
        self.repos.token.mark_failed(addresses).await
    }

    async fn get_unknown_addresses(&self, limit: u64) -> Result<Vec<String>, DbError> {
        self.repos.address.get_unknown(limit).await
    }

    async fn update_address_kinds(
        &self,
        kinds: &HashMap<String, AddressKind>,
    ) -> Result<(), DbError> {
        self.repos.address.update_kinds(kinds).await
    }

    async fn get_failed_tokens(&self, limit: u64) -> Result<Vec<String>, DbError> {
        self.repos.token.get_failed(limit).await
    }

    async fn mark_token_retry(&self, address: &str) -> Result<(), DbError> {
        self.repos.token.mark_retry(address).await
    }

    async fn save_activity_slots(
        &self,
        slots: &HashMap<(String, String), SlotActivity>,
    ) -> Result<(), DbError> {
        self.repos.activity.upsert_slots(slots).await
    }

    async fn get_recent_tokens(&self, limit: u64) -> Result<Vec<String>, DbError> {
        self.repos.token.get_recent(limit).await
    }

    async fn get_token(&self, address: &str) -> Result<Option<TokenInfo>, DbError> {
        self.repos.token.get_token(address).await
    }

    async fn count_wallets(&self) -> Result<u64, DbError> {
        self.repos.address.count_wallets().await
    }

    async fn get_wallets_for_scan(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<String>, DbError> {
        self.repos.address.get_wallets(limit, offset).await
    }

    async fn save_wallet_holdings(
        &self,
        wallet: &str,
        holdings: &HashMap<String, HoldingBalance>,
    ) -> Result<(), DbError> {
        self.repos.holdings.replace_for_wallet(wallet, holdings).await
    }

    async fn update_scan_progress(&self, update: ScanProgressUpdate) -> Result<(), DbError> {
        self.repos.scan_progress.update(&update).await
    }
}
