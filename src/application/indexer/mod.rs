pub mod block_processor;
pub mod monitor;

pub use block_processor::{BatchSummary, BlockProcessor};
pub use monitor::ChainMonitor;
