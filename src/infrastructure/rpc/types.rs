//! Typed views over JSON-RPC payloads, decoded once at the client boundary

use serde::Deserialize;

use crate::utils::encoding::safe_hex_to_u64;

/// A full block with its transactions (eth_getBlockByNumber with includeTx)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Block {
    /// Hex block number
    #[serde(default)]
    pub number: String,
    /// Hex unix timestamp
    #[serde(default)]
    pub timestamp: String,
    /// Transactions included in the block
    #[serde(default)]
    pub transactions: Vec<BlockTransaction>,
}

impl Block {
    /// Block number as an integer ("0x"/empty tolerated as zero)
    pub fn number(&self) -> u64 {
        safe_hex_to_u64(&self.number)
    }

    /// Block timestamp as a unix timestamp
    pub fn timestamp(&self) -> u64 {
        safe_hex_to_u64(&self.timestamp)
    }
}

/// A transaction as carried inside a block
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockTransaction {
    /// Transaction hash
    #[serde(default)]
    pub hash: String,
    /// Sender address
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient address; None for contract-creation transactions
    #[serde(default)]
    pub to: Option<String>,
}

impl BlockTransaction {
    /// True when this transaction deployed a contract
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_none() && self.from.is_some()
    }
}

/// A transaction receipt, reduced to the field the indexer inspects
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxReceipt {
    /// Address of the contract created by this transaction, if any
    #[serde(rename = "contractAddress", default)]
    pub contract_address: Option<String>,
}
