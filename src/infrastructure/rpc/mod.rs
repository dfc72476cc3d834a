pub mod client;
pub mod endpoint;
pub mod error;
pub mod rotator;
pub mod types;

pub use client::{ChainClient, RpcClient};
pub use endpoint::{pick_best, Endpoint, EndpointInfo, EndpointProbe};
pub use error::RpcError;
pub use rotator::{EndpointProber, EndpointRotator, HttpProber};
pub use types::{Block, BlockTransaction, TxReceipt};
