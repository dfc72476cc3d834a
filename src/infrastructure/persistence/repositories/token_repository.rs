use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement,
};

use crate::domain::models::{TokenInfo, TokenStatus};
use crate::infrastructure::persistence::entities::tokens;
use crate::infrastructure::persistence::error::DbError;

/// Repository for detected token operations
#[derive(Clone)]
pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    /// Create a new TokenRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Upsert a batch of detected tokens with their metadata
    pub async fn save_detected(
        &self,
        tokens: &HashMap<String, TokenInfo>,
    ) -> Result<(), DbError> {
        if tokens.is_empty() {
            return Ok(());
        }

        let values: Vec<String> = tokens
            .iter()
            .map(|(address, info)| {
                format!(
                    "('{}', '{}', '{}', {}, '{}', '{}', '{}', CURRENT_TIMESTAMP)",
                    address.replace('\'', "''"),
                    info.name.replace('\'', "''"),
                    info.symbol.replace('\'', "''"),
                    info.decimals as i32,
                    info.total_supply.replace('\'', "''"),
                    info.creator.replace('\'', "''"),
                    TokenStatus::Detected.as_str()
                )
            })
            .collect();

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO tokens
                    (address, name, symbol, decimals, total_supply, creator, status, discovered_at)
                VALUES
                    {}
                ON CONFLICT (address)
                DO UPDATE SET
                    name = EXCLUDED.name,
                    symbol = EXCLUDED.symbol,
                    decimals = EXCLUDED.decimals,
                    total_supply = EXCLUDED.total_supply,
                    creator = EXCLUDED.creator,
                    status = EXCLUDED.status,
                    last_retry = NULL
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

    /// Record contracts whose metadata probe failed so they can be retried later.
    /// Never downgrades a contract already saved with full metadata.
    pub async fn mark_failed(&self, addresses: &[String]) -> Result<(), DbError> {
        if addresses.is_empty() {
            return Ok(());
        }

        let values: Vec<String> = addresses
            .iter()
            .map(|address| {
                format!(
                    "('{}', '', '', 0, '0', 'Unknown', '{}', CURRENT_TIMESTAMP)",
                    address.replace('\'', "''"),
                    TokenStatus::Failed.as_str()
                )
            })
            .collect();

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO tokens
                    (address, name, symbol, decimals, total_supply, creator, status, discovered_at)
                VALUES
                    {}
                ON CONFLICT (address) DO NOTHING
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

    /// Get failed tokens eligible for a retry (none attempted within the last hour)
    pub async fn get_failed(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                SELECT address FROM tokens
                WHERE status = '{}'
                  AND (last_retry IS NULL OR last_retry < CURRENT_TIMESTAMP - INTERVAL '1 hour')
                ORDER BY discovered_at ASC
                LIMIT {}
                "#,
                TokenStatus::Failed.as_str(),
                limit
            ),
        );

        let rows = self
            .conn
            .query_all(stmt)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let mut addresses = Vec::with_capacity(rows.len());
        for row in rows {
            let address: String = row
                .try_get("", "address")
                .map_err(|e| DbError::QueryError(e.to_string()))?;
            addresses.push(address);
        }

        Ok(addresses)
    }

    /// Stamp a retry attempt on a failed token
    pub async fn mark_retry(&self, address: &str) -> Result<(), DbError> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                "UPDATE tokens SET last_retry = CURRENT_TIMESTAMP WHERE address = '{}'",
                address.replace('\'', "''")
            ),
        );

        self.conn
            .execute(stmt)
            .await
            .map(|_| ())
            .map_err(|e| DbError::QueryError(e.to_string()))
    }

    /// Get the most recently discovered tokens with full metadata
    pub async fn get_recent(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let rows = tokens::Entity::find()
            .filter(tokens::Column::Status.eq(TokenStatus::Detected.as_str()))
            .order_by_desc(tokens::Column::DiscoveredAt)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|m| m.address).collect())
    }

    /// Get the stored metadata for a single token
    pub async fn get_token(&self, address: &str) -> Result<Option<TokenInfo>, DbError> {
        let row = tokens::Entity::find_by_id(address.to_string())
            .one(&self.conn)
            .await?;

        Ok(row.map(|m| TokenInfo {
            name: m.name,
            symbol: m.symbol,
            decimals: m.decimals as u32,
            total_supply: m.total_supply,
            creator: m.creator,
        }))
    }
}
