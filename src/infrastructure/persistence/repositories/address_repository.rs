use std::collections::{HashMap, HashSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement,
};

use crate::domain::models::AddressKind;
use crate::infrastructure::persistence::entities::addresses;
use crate::infrastructure::persistence::error::DbError;

/// Repository for address classification and activity operations
#[derive(Clone)]
pub struct AddressRepository {
    conn: DatabaseConnection,
}

impl AddressRepository {
    /// Create a new AddressRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Return the subset of the given addresses that have no settled classification yet
    pub async fn filter_unseen(
        &self,
        candidates: &HashSet<String>,
    ) -> Result<HashSet<String>, DbError> {
        if candidates.is_empty() {
            return Ok(HashSet::new());
        }

        let list: Vec<String> = candidates.iter().cloned().collect();
        let known = addresses::Entity::find()
            .filter(addresses::Column::Address.is_in(list))
            .filter(addresses::Column::AddressType.ne(AddressKind::Unknown.as_str()))
            .all(&self.conn)
            .await?;

        let known: HashSet<String> = known.into_iter().map(|m| m.address).collect();
        Ok(candidates.difference(&known).cloned().collect())
    }

    /// Upsert a batch of classified addresses, stamping their latest activity.
    /// An incoming 'unknown' never downgrades a previously settled type.
    pub async fn save_batch(
        &self,
        kinds: &HashMap<String, AddressKind>,
        block: u64,
        timestamp: u64,
    ) -> Result<usize, DbError> {
        if kinds.is_empty() {
            return Ok(0);
        }

        let values: Vec<String> = kinds
            .iter()
            .map(|(address, kind)| {
                format!(
                    "('{}', '{}', {}, {}, CURRENT_TIMESTAMP)",
                    address.replace('\'', "''"),
                    kind.as_str(),
                    block as i64,
                    timestamp as i64
                )
            })
            .collect();

        let stmt = Statement::from_string(
            DbBackend::Postgres,
            format!(
                r#"
                INSERT INTO addresses
                    (address, address_type, last_activity_block, last_activity_timestamp, updated_at)
                VALUES
                    {}
                ON CONFLICT (address)
                DO UPDATE SET
                    address_type = CASE
                        WHEN EXCLUDED.address_type <> 'unknown' THEN EXCLUDED.address_type
                        ELSE addresses.address_type
                    END,
                    last_activity_block = EXCLUDED.last_activity_block,
                    last_activity_timestamp = EXCLUDED.last_activity_timestamp,
                    updated_at = CURRENT_TIMESTAMP
                "#,
                values.join(",\n                    ")
            ),
        );

        self.conn
            .execute(stmt)
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(kinds.len())
    }

    /// Get unresolved addresses, oldest activity first
    pub async fn get_unknown(&self, limit: u64) -> Result<Vec<String>, DbError> {
        let rows = addresses::Entity::find()
            .filter(addresses::Column::AddressType.eq(AddressKind::Unknown.as_str()))
            .order_by_asc(addresses::Column::LastActivityBlock)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|m| m.address).collect())
    }

    /// Overwrite the classification of the given addresses
    pub async fn update_kinds(
        &self,
        kinds: &HashMap<String, AddressKind>,
    ) -> Result<(), DbError> {
        for (address, kind) in kinds {
            let stmt = Statement::from_string(
                DbBackend::Postgres,
                format!(
                    "UPDATE addresses SET address_type = '{}', updated_at = CURRENT_TIMESTAMP WHERE address = '{}'",
                    kind.as_str(),
                    address.replace('\'', "''")
                ),
            );

            self.conn
                .execute(stmt)
                .await
                .map_err(|e| DbError::QueryError(e.to_string()))?;
        }

        Ok(())
    }

    /// Count addresses classified as wallets
    pub async fn count_wallets(&self) -> Result<u64, DbError> {
        let count = addresses::Entity::find()
            .filter(addresses::Column::AddressType.eq(AddressKind::Wallet.as_str()))
            .count(&self.conn)
            .await?;

        Ok(count)
    }

    /// Get a page of wallet addresses, most recently active first
    pub async fn get_wallets(&self, limit: u64, offset: u64) -> Result<Vec<String>, DbError> {
        let rows = addresses::Entity::find()
            .filter(addresses::Column::AddressType.eq(AddressKind::Wallet.as_str()))
            .order_by_desc(addresses::Column::LastActivityBlock)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|m| m.address).collect())
    }
}
