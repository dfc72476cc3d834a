use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    ActivityRepository, AddressRepository, CheckpointRepository, HoldingsRepository,
    Repositories, ScanProgressRepository, TokenRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_address_repository(conn.clone()),
            Self::create_token_repository(conn.clone()),
            Self::create_checkpoint_repository(conn.clone()),
            Self::create_activity_repository(conn.clone()),
            Self::create_holdings_repository(conn.clone()),
            Self::create_scan_progress_repository(conn),
        )
    }

    /// Create an address repository
    pub fn create_address_repository(conn: DatabaseConnection) -> AddressRepository {
        AddressRepository::new(conn)
    }

    /// Create a token repository
    pub fn create_token_repository(conn: DatabaseConnection) -> TokenRepository {
        TokenRepository::new(conn)
    }

    /// Create a checkpoint repository
    pub fn create_checkpoint_repository(conn: DatabaseConnection) -> CheckpointRepository {
        CheckpointRepository::new(conn)
    }

    /// Create an activity repository
    pub fn create_activity_repository(conn: DatabaseConnection) -> ActivityRepository {
        ActivityRepository::new(conn)
    }

    /// Create a holdings repository
    pub fn create_holdings_repository(conn: DatabaseConnection) -> HoldingsRepository {
        HoldingsRepository::new(conn)
    }

    /// Create a scan progress repository
    pub fn create_scan_progress_repository(conn: DatabaseConnection) -> ScanProgressRepository {
        ScanProgressRepository::new(conn)
    }
}
