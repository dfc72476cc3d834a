mod common;

use std::collections::HashMap;
use std::sync::Arc;

use common::{MemoryStore, MockChain};
use hyperevm_indexer::application::scanner::WalletScanner;
use hyperevm_indexer::config::ScannerConfig;
use hyperevm_indexer::domain::models::{AddressKind, ScanStatus, TokenInfo};
use hyperevm_indexer::domain::services::token_detector::SELECTOR_BALANCE_OF;
use hyperevm_indexer::domain::store::IndexerStore;
use hyperevm_indexer::utils::encoding::pad_address_for_call;
use num_bigint::BigUint;

const WALLET: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const TOKEN_HELD: &str = "0x1111111111111111111111111111111111111111";
const TOKEN_EMPTY: &str = "0x2222222222222222222222222222222222222222";
const TOKEN_DOWN: &str = "0x3333333333333333333333333333333333333333";

fn scanner_config() -> ScannerConfig {
    ScannerConfig {
        wallet_batch_size: 25,
        token_concurrency: 30,
        popular_tokens_limit: 30,
        retry_attempts: 2,
        wallet_timeout_secs: 45,
        balance_timeout_secs: 2,
    }
}

fn token_info(symbol: &str) -> TokenInfo {
    TokenInfo {
        name: format!("{} Token", symbol),
        symbol: symbol.to_string(),
        decimals: 18,
        total_supply: "1000000000000000000000000".to_string(),
        creator: "Unknown".to_string(),
    }
}

fn balance_call(wallet: &str) -> String {
    format!("{}{}", SELECTOR_BALANCE_OF, pad_address_for_call(wallet))
}

fn set_balance(chain: &MockChain, token: &str, wallet: &str, balance: &BigUint) {
    let hex = format!("0x{:0>64}", balance.to_str_radix(16));
    chain.set_call(token, &balance_call(wallet), &hex);
}

async fn seed_store(store: &MemoryStore) {
    let mut kinds = HashMap::new();
    kinds.insert(WALLET.to_string(), AddressKind::Wallet);
    store.save_addresses(&kinds, 100, 1750255407).await.unwrap();

    let mut tokens = HashMap::new();
    tokens.insert(TOKEN_HELD.to_string(), token_info("HELD"));
    tokens.insert(TOKEN_EMPTY.to_string(), token_info("NONE"));
    store.save_tokens(&tokens).await.unwrap();
}

#[tokio::test]
async fn zero_balances_are_omitted_from_holdings() {
    let chain = Arc::new(MockChain::new());
    let store = Arc::new(MemoryStore::new());
    seed_store(&store).await;

    // 1500 whole tokens at 18 decimals
    let balance = BigUint::from(1500u32) * BigUint::from(10u32).pow(18);
    set_balance(&chain, TOKEN_HELD, WALLET, &balance);
    set_balance(&chain, TOKEN_EMPTY, WALLET, &BigUint::from(0u32));

    let scanner = WalletScanner::new(chain, store.clone(), scanner_config());
    let tokens = vec![
        (TOKEN_HELD.to_string(), token_info("HELD")),
        (TOKEN_EMPTY.to_string(), token_info("NONE")),
    ];
    let holdings = scanner.scan_wallet(WALLET, &tokens).await;

    assert_eq!(holdings.len(), 1);
    let held = holdings.get(TOKEN_HELD).unwrap();
    assert_eq!(held.raw, "1500000000000000000000");
    assert_eq!(held.formatted, "1.5K");
}

#[tokio::test]
async fn unreachable_token_is_skipped_after_retries() {
    let chain = Arc::new(MockChain::new());
    let store = Arc::new(MemoryStore::new());

    chain.fail_calls_to(TOKEN_DOWN);
    let balance = BigUint::from(5u32) * BigUint::from(10u32).pow(18);
    set_balance(&chain, TOKEN_HELD, WALLET, &balance);

    let scanner = WalletScanner::new(chain, store, scanner_config());
    let tokens = vec![
        (TOKEN_HELD.to_string(), token_info("HELD")),
        (TOKEN_DOWN.to_string(), token_info("DOWN")),
    ];
    let holdings = scanner.scan_wallet(WALLET, &tokens).await;

    assert_eq!(holdings.len(), 1);
    assert!(holdings.contains_key(TOKEN_HELD));
}

#[tokio::test]
async fn scan_all_persists_holdings_and_completes_progress() {
    let chain = Arc::new(MockChain::new());
    let store = Arc::new(MemoryStore::new());
    seed_store(&store).await;

    let balance = BigUint::from(42u32) * BigUint::from(10u32).pow(18);
    set_balance(&chain, TOKEN_HELD, WALLET, &balance);
    set_balance(&chain, TOKEN_EMPTY, WALLET, &BigUint::from(0u32));

    let scanner = WalletScanner::new(chain, store.clone(), scanner_config());
    scanner.scan_all().await.unwrap();

    let holdings = store.holdings_of(WALLET);
    assert_eq!(holdings.len(), 1);
    assert!(holdings.contains_key(TOKEN_HELD));

    let progress = store.progress_log();
    assert!(matches!(progress.first().unwrap().status, ScanStatus::Running));
    let last = progress.last().unwrap();
    assert!(matches!(last.status, ScanStatus::Completed));
    assert_eq!(last.scanned, Some(1));
    assert_eq!(last.total, Some(1));
}

#[tokio::test]
async fn scan_with_no_tokens_completes_immediately() {
    let chain = Arc::new(MockChain::new());
    let store = Arc::new(MemoryStore::new());

    let mut kinds = HashMap::new();
    kinds.insert(WALLET.to_string(), AddressKind::Wallet);
    store.save_addresses(&kinds, 100, 1750255407).await.unwrap();

    let scanner = WalletScanner::new(chain, store.clone(), scanner_config());
    scanner.scan_all().await.unwrap();

    let progress = store.progress_log();
    assert_eq!(progress.len(), 1);
    assert!(matches!(progress[0].status, ScanStatus::Completed));
    assert!(store.holdings_of(WALLET).is_empty());
}
