pub mod activity_repository;
pub mod address_repository;
pub mod checkpoint_repository;
pub mod holdings_repository;
pub mod scan_progress_repository;
pub mod token_repository;

pub use activity_repository::ActivityRepository;
pub use address_repository::AddressRepository;
pub use checkpoint_repository::CheckpointRepository;
pub use holdings_repository::HoldingsRepository;
pub use scan_progress_repository::ScanProgressRepository;
pub use token_repository::TokenRepository;

/// Collection of all repositories
pub struct Repositories {
    /// Repository for address operations
    pub address: AddressRepository,
    /// Repository for token operations
    pub token: TokenRepository,
    /// Repository for checkpoint operations
    pub checkpoint: CheckpointRepository,
    /// Repository for activity slot operations
    pub activity: ActivityRepository,
    /// Repository for wallet holdings operations
    pub holdings: HoldingsRepository,
    /// Repository for scan progress operations
    pub scan_progress: ScanProgressRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        address: AddressRepository,
        token: TokenRepository,
        checkpoint: CheckpointRepository,
        activity: ActivityRepository,
        holdings: HoldingsRepository,
        scan_progress: ScanProgressRepository,
    ) -> Self {
        Self {
            address,
            token,
            checkpoint,
            activity,
            holdings,
            scan_progress,
        }
    }
}
