use std::error::Error;
use std::fmt;

use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::rpc::error::RpcError;

/// Error type for the ingestion pipeline and the wallet scan
#[derive(Debug)]
pub enum IndexerError {
    RpcError(RpcError),
    DbError(DbError),
    ConfigError(String),
    ProcessingError(String),
}

impl fmt::Display for IndexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexerError::RpcError(e) => write!(f, "RPC error: {}", e),
            IndexerError::DbError(e) => write!(f, "Database error: {}", e),
            IndexerError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            IndexerError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl Error for IndexerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IndexerError::RpcError(e) => Some(e),
            IndexerError::DbError(e) => Some(e),
            IndexerError::ConfigError(_) => None,
            IndexerError::ProcessingError(_) => None,
        }
    }
}

impl From<RpcError> for IndexerError {
    fn from(error: RpcError) -> Self {
        IndexerError::RpcError(error)
    }
}

impl From<DbError> for IndexerError {
    fn from(error: DbError) -> Self {
        IndexerError::DbError(error)
    }
}
