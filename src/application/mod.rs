pub mod indexer;
pub mod scanner;
