use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::models::{ScanProgressUpdate, ScanStatus};
use crate::infrastructure::persistence::entities::scan_progress;
use crate::infrastructure::persistence::error::DbError;

const PROGRESS_ID: i32 = 1;

/// Repository for the single-row wallet scan progress record
#[derive(Clone)]
pub struct ScanProgressRepository {
    conn: DatabaseConnection,
}

impl ScanProgressRepository {
    /// Create a new ScanProgressRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Apply a progress update. Fields left unset keep their stored value,
    /// and the current wallet is cleared once the scan leaves the running state.
    pub async fn update(&self, update: &ScanProgressUpdate) -> Result<(), DbError> {
        let existing = scan_progress::Entity::find_by_id(PROGRESS_ID)
            .one(&self.conn)
            .await?;

        let running = matches!(update.status, ScanStatus::Running);

        match existing {
            Some(row) => {
                let mut active: scan_progress::ActiveModel = row.into();
                active.status = Set(update.status.as_str().to_string());
                if let Some(wallet) = &update.current_wallet {
                    active.current_wallet = Set(Some(wallet.clone()));
                } else if !running {
                    active.current_wallet = Set(None);
                }
                if let Some(scanned) = update.scanned {
                    active.scanned = Set(scanned as i64);
                }
                if let Some(total) = update.total {
                    active.total = Set(total as i64);
                }
                active.updated_at = Set(Utc::now().into());
                active.update(&self.conn).await?;
            }
            None => {
                let active = scan_progress::ActiveModel {
                    id: Set(PROGRESS_ID),
                    status: Set(update.status.as_str().to_string()),
                    current_wallet: Set(update.current_wallet.clone()),
                    scanned: Set(update.scanned.unwrap_or(0) as i64),
                    total: Set(update.total.unwrap_or(0) as i64),
                    updated_at: Set(Utc::now().into()),
                };
                active.insert(&self.conn).await?;
            }
        }

        Ok(())
    }
}
