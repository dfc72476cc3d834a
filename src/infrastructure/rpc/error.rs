use std::error::Error;
use std::fmt;

/// Error type for JSON-RPC operations
#[derive(Debug, Clone)]
pub enum RpcError {
    /// No configured endpoint is currently reachable
    NoEndpoint,
    /// Transport-level failure (connect, HTTP status, body read)
    Http(String),
    /// The request timed out
    Timeout,
    /// The provider answered with a JSON-RPC error
    Provider(String),
    /// The response payload could not be decoded
    Decode(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::NoEndpoint => write!(f, "No RPC endpoint available"),
            RpcError::Http(msg) => write!(f, "RPC transport error: {}", msg),
            RpcError::Timeout => write!(f, "RPC request timed out"),
            RpcError::Provider(msg) => write!(f, "RPC provider error: {}", msg),
            RpcError::Decode(msg) => write!(f, "RPC decode error: {}", msg),
        }
    }
}

impl Error for RpcError {}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RpcError::Timeout
        } else {
            RpcError::Http(err.to_string())
        }
    }
}
