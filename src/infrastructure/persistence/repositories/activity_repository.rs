use std::collections::HashMap;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};

use crate::domain::models::SlotActivity;
use crate::infrastructure::persistence::error::DbError;

/// Repository for five-minute activity slot statistics
#[derive(Clone)]
pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    /// Create a new ActivityRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Upsert activity slots keyed by (date, time slot). The new counts
    /// replace any previously stored counts for the same slot.
    pub async fn upsert_slots(
        &self,
        slots: &HashMap<(String, String), SlotActivity>,
    ) -> Result<(), DbError> {
        if slots.is_empty() {
            return Ok(());
        }

        let values: Vec<String> = slots
            .iter()
            .map(|((date, slot), activity)| {
                format!(
                    "('{}', '{}', {}, {}, CURRENT_TIMESTAMP)",
                    date.replace('\'', "''"),
                    slot.replace('\'', "''"),
                    activity.addresses.len() as i64,
                    activity.transactions as i64
                )
            })
            .collect();

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO activity_stats
                    (date, time_slot, active_wallets, total_transactions, updated_at)
                VALUES
                    {}
                ON CONFLICT (date, time_slot)
                DO UPDATE SET
                    active_wallets = EXCLUDED.active_wallets,
                    total_transactions = EXCLUDED.total_transactions,
                    updated_at = CURRENT_TIMESTAMP
                "#,
                values.join(",\n                    ")
            ),
        );

        self.conn
            .execute(stmt)
            .await
            .map(|_| ())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
