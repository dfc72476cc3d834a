//! Storage contract consumed by the pipeline and the scanner

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::models::{
    AddressKind, HoldingBalance, ScanProgressUpdate, SlotActivity, TokenInfo,
};
use crate::infrastructure::persistence::error::DbError;

/// Semantic contract of the relational store. Implemented by the SeaORM
/// backend and by in-memory fakes in tests. Per-call atomicity only; the
/// maintenance passes heal partial-batch crashes.
#[async_trait]
pub trait IndexerStore: Send + Sync {
    /// Resume pointer: last fully processed block and active endpoint URL
    async fn get_checkpoint(&self) -> Result<(Option<u64>, Option<String>), DbError>;

    /// Persist the resume pointer, optionally with the endpoint URL
    async fn save_checkpoint(&self, block: u64, endpoint_url: Option<&str>)
        -> Result<(), DbError>;

    /// Persist only the active endpoint URL
    async fn save_endpoint_choice(&self, url: &str) -> Result<(), DbError>;

    /// Subset of `addresses` not yet stored with a definitive type
    async fn filter_unseen(&self, addresses: &HashSet<String>)
        -> Result<HashSet<String>, DbError>;

    /// Upsert address classifications stamped with the batch's block and
    /// timestamp. An Unknown kind never clobbers a settled stored type.
    /// Returns the number of rows written.
    async fn save_addresses(
        &self,
        kinds: &HashMap<String, AddressKind>,
        block: u64,
        timestamp: u64,
    ) -> Result<usize, DbError>;

    /// Upsert detected tokens (status becomes "detected")
    async fn save_tokens(&self, tokens: &HashMap<String, TokenInfo>) -> Result<(), DbError>;

    /// Record contracts whose probe failed transiently (status "failed")
    async fn mark_tokens_failed(&self, addresses: &[String]) -> Result<(), DbError>;

    /// Addresses still marked unknown, oldest observed block first
    async fn get_unknown_addresses(&self, limit: u64) -> Result<Vec<String>, DbError>;

    /// Overwrite address types resolved by a maintenance pass
    async fn update_address_kinds(
        &self,
        kinds: &HashMap<String, AddressKind>,
    ) -> Result<(), DbError>;

    /// Failed tokens eligible for retry (last retry at least an hour old)
    async fn get_failed_tokens(&self, limit: u64) -> Result<Vec<String>, DbError>;

    /// Stamp a retry attempt on a failed token
    async fn mark_token_retry(&self, address: &str) -> Result<(), DbError>;

    /// Upsert activity buckets, replacing each slot's counts
    async fn save_activity_slots(
        &self,
        slots: &HashMap<(String, String), SlotActivity>,
    ) -> Result<(), DbError>;

    /// Most recently discovered tokens, newest first
    async fn get_recent_tokens(&self, limit: u64) -> Result<Vec<String>, DbError>;

    /// Stored metadata for one token
    async fn get_token(&self, address: &str) -> Result<Option<TokenInfo>, DbError>;

    /// Number of addresses classified as wallets
    async fn count_wallets(&self) -> Result<u64, DbError>;

    /// Page of wallet addresses for the scan
    async fn get_wallets_for_scan(&self, limit: u64, offset: u64)
        -> Result<Vec<String>, DbError>;

    /// Replace a wallet's holdings wholesale
    async fn save_wallet_holdings(
        &self,
        wallet: &str,
        holdings: &HashMap<String, HoldingBalance>,
    ) -> Result<(), DbError>;

    /// Update the shared scan progress record
    async fn update_scan_progress(&self, update: ScanProgressUpdate) -> Result<(), DbError>;
}
