use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, Statement};

use crate::infrastructure::persistence::entities::checkpoint;
use crate::infrastructure::persistence::error::DbError;

const CHECKPOINT_ID: i32 = 1;

/// Repository for the single-row ingestion checkpoint
#[derive(Clone)]
pub struct CheckpointRepository {
    conn: DatabaseConnection,
}

impl CheckpointRepository {
    /// Create a new CheckpointRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the last processed block and the endpoint in use when it was saved
    pub async fn get(&self) -> Result<(Option<u64>, Option<String>), DbError> {
        let row = checkpoint::Entity::find_by_id(CHECKPOINT_ID)
            .one(&self.conn)
            .await?;

        match row {
            Some(cp) => Ok((Some(cp.current_block as u64), cp.current_endpoint_url)),
            None => Ok((None, None)),
        }
    }

    /// Save the checkpoint. The stored block never moves backwards.
    pub async fn save(&self, block: u64, endpoint_url: Option<&str>) -> Result<(), DbError> {
        let url_value = match endpoint_url {
            Some(url) => format!("'{}'", url.replace('\'', "''")),
            None => "indexer_checkpoint.current_endpoint_url".to_string(),
        };
        let url_insert = match endpoint_url {
            Some(url) => format!("'{}'", url.replace('\'', "''")),
            None => "NULL".to_string(),
        };

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO indexer_checkpoint (id, current_block, current_endpoint_url, started_at)
                VALUES ({}, {}, {}, CURRENT_TIMESTAMP)
                ON CONFLICT (id)
                DO UPDATE SET
                    current_block = GREATEST(indexer_checkpoint.current_block, EXCLUDED.current_block),
                    current_endpoint_url = {}
                "#,
                CHECKPOINT_ID, block as i64, url_insert, url_value
            ),
        );

        self.conn
            .execute(stmt)
            .await
            .map(|_| ())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Record which endpoint the indexer is currently using
    pub async fn save_endpoint(&self, url: &str) -> Result<(), DbError> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO indexer_checkpoint (id, current_block, current_endpoint_url, started_at)
                VALUES ({}, 0, '{}', CURRENT_TIMESTAMP)
                ON CONFLICT (id)
                DO UPDATE SET current_endpoint_url = EXCLUDED.current_endpoint_url
                "#,
                CHECKPOINT_ID,
                url.replace('\'', "''")
            ),
        );

        self.conn
            .execute(stmt)
            .await
            .map(|_| ())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }
}
