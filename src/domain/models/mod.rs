//! Domain records shared between the pipeline, the scanner and the store

use std::collections::HashSet;

/// Classification of an observed address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Address with no deployed bytecode
    Wallet,
    /// Address with deployed bytecode
    Contract,
    /// Classification pending or failed; retried by maintenance
    Unknown,
}

impl AddressKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressKind::Wallet => "wallet",
            AddressKind::Contract => "contract",
            AddressKind::Unknown => "unknown",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "wallet" => AddressKind::Wallet,
            "contract" => AddressKind::Contract,
            _ => AddressKind::Unknown,
        }
    }
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata of a detected ERC-20 token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    /// Exact decimal string; uint256 supplies must never be truncated
    pub total_supply: String,
    /// Deploying address, "Unknown" when the backward search found nothing
    pub creator: String,
}

/// Lifecycle of a token record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Detected,
    Failed,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Detected => "detected",
            TokenStatus::Failed => "failed",
        }
    }
}

/// Activity observed for one (date, 5-minute slot) bucket within a batch
#[derive(Debug, Clone, Default)]
pub struct SlotActivity {
    /// Distinct participant addresses seen in the slot
    pub addresses: HashSet<String>,
    /// Transactions counted in the slot
    pub transactions: u64,
}

/// A token balance held by a wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingBalance {
    /// Raw integer balance as a decimal string
    pub raw: String,
    /// Balance scaled by the token's decimals for display
    pub formatted: String,
}

/// State of the wallet scan batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Idle,
    Running,
    Completed,
    Interrupted,
    Error,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Idle => "idle",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Interrupted => "interrupted",
            ScanStatus::Error => "error",
        }
    }
}

/// Partial update of the shared scan progress record
#[derive(Debug, Clone)]
pub struct ScanProgressUpdate {
    pub status: ScanStatus,
    pub current_wallet: Option<String>,
    pub scanned: Option<u64>,
    pub total: Option<u64>,
}

impl ScanProgressUpdate {
    pub fn status_only(status: ScanStatus) -> Self {
        Self {
            status,
            current_wallet: None,
            scanned: None,
            total: None,
        }
    }
}
