//! Batch scan of wallet token balances over the recently discovered tokens

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use num_traits::Zero;

use crate::config::ScannerConfig;
use crate::domain::errors::IndexerError;
use crate::domain::models::{HoldingBalance, ScanProgressUpdate, ScanStatus, TokenInfo};
use crate::domain::services::token_detector::SELECTOR_BALANCE_OF;
use crate::domain::store::IndexerStore;
use crate::infrastructure::rpc::ChainClient;
use crate::utils::encoding::{format_supply, hex_to_biguint, pad_address_for_call};
use crate::utils::logging;

/// Scans every known wallet for balances of the popular token set
pub struct WalletScanner {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn IndexerStore>,
    config: ScannerConfig,
}

impl WalletScanner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn IndexerStore>,
        config: ScannerConfig,
    ) -> Self {
        Self {
            chain,
            store,
            config,
        }
    }

    /// Look up one wallet's balance of one token. Retried a configured number
    /// of times with a short per-call timeout; None when every attempt failed
    /// or the balance decoded to nothing.
    async fn balance_of(&self, wallet: &str, token: &str) -> Option<String> {
        let data = format!("{}{}", SELECTOR_BALANCE_OF, pad_address_for_call(wallet));
        let timeout = Duration::from_secs(self.config.balance_timeout_secs);

        for attempt in 0..self.config.retry_attempts {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            match tokio::time::timeout(timeout, self.chain.call_contract(token, &data)).await {
                Ok(Ok(result)) => return Some(result),
                Ok(Err(_)) | Err(_) => continue,
            }
        }

        None
    }

    /// Probe one wallet against the token set with bounded concurrency.
    /// Zero balances are omitted.
    pub async fn scan_wallet(
        &self,
        wallet: &str,
        tokens: &[(String, TokenInfo)],
    ) -> HashMap<String, HoldingBalance> {
        stream::iter(tokens.iter())
            .map(|(token, info)| async move {
                let raw_hex = self.balance_of(wallet, token).await?;
                let balance = hex_to_biguint(&raw_hex)?;
                if balance.is_zero() {
                    return None;
                }
                let raw = balance.to_string();
                let formatted = format_supply(&raw, info.decimals);
                Some((token.clone(), HoldingBalance { raw, formatted }))
            })
            .buffer_unordered(self.config.token_concurrency)
            .filter_map(|holding| async move { holding })
            .collect()
            .await
    }

    /// Scan all wallets page by page, persisting each wallet's holdings and
    /// keeping the shared progress record current.
    pub async fn scan_all(&self) -> Result<(), IndexerError> {
        let tokens = self.load_token_set().await?;
        if tokens.is_empty() {
            logging::log_warning("No tokens discovered yet, nothing to scan");
            self.store
                .update_scan_progress(ScanProgressUpdate::status_only(ScanStatus::Completed))
                .await?;
            return Ok(());
        }

        let total = self.store.count_wallets().await?;
        logging::log_info(&format!(
            "Scanning {} wallets against {} tokens",
            total,
            tokens.len()
        ));

        self.store
            .update_scan_progress(ScanProgressUpdate {
                status: ScanStatus::Running,
                current_wallet: None,
                scanned: Some(0),
                total: Some(total),
            })
            .await?;

        let wallet_timeout = Duration::from_secs(self.config.wallet_timeout_secs);
        let mut scanned = 0u64;
        let mut offset = 0u64;

        loop {
            let wallets = self
                .store
                .get_wallets_for_scan(self.config.wallet_batch_size, offset)
                .await?;
            if wallets.is_empty() {
                break;
            }
            offset += wallets.len() as u64;

            for wallet in wallets {
                match tokio::time::timeout(wallet_timeout, self.scan_wallet(&wallet, &tokens))
                    .await
                {
                    Ok(holdings) => {
                        self.store.save_wallet_holdings(&wallet, &holdings).await?;
                    }
                    Err(_) => {
                        // Stale holdings are kept rather than replaced with a
                        // partial snapshot.
                        logging::log_warning(&format!("Wallet {} timed out, skipping", wallet));
                    }
                }

                scanned += 1;
                self.store
                    .update_scan_progress(ScanProgressUpdate {
                        status: ScanStatus::Running,
                        current_wallet: Some(wallet),
                        scanned: Some(scanned),
                        total: Some(total),
                    })
                    .await?;
            }
        }

        self.store
            .update_scan_progress(ScanProgressUpdate {
                status: ScanStatus::Completed,
                current_wallet: None,
                scanned: Some(scanned),
                total: Some(total),
            })
            .await?;

        logging::log_info(&format!("Scan completed: {} wallets", scanned));
        Ok(())
    }

    /// The most recently discovered tokens with stored metadata
    async fn load_token_set(&self) -> Result<Vec<(String, TokenInfo)>, IndexerError> {
        let addresses = self
            .store
            .get_recent_tokens(self.config.popular_tokens_limit)
            .await?;

        let mut tokens = Vec::with_capacity(addresses.len());
        for address in addresses {
            if let Some(info) = self.store.get_token(&address).await? {
                tokens.push((address, info));
            }
        }
        Ok(tokens)
    }
}
