pub mod activity_stats;
pub mod addresses;
pub mod checkpoint;
pub mod scan_progress;
pub mod tokens;
pub mod wallet_holdings;
