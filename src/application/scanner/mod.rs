pub mod wallet_scanner;

pub use wallet_scanner::WalletScanner;
