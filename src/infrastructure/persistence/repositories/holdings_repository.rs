use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::models::HoldingBalance;
use crate::infrastructure::persistence::entities::wallet_holdings;
use crate::infrastructure::persistence::error::DbError;

/// Repository for wallet token holdings
#[derive(Clone)]
pub struct HoldingsRepository {
    conn: DatabaseConnection,
}

impl HoldingsRepository {
    /// Create a new HoldingsRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Replace all stored holdings of a wallet with a fresh snapshot.
    /// Tokens the wallet no longer holds are dropped.
    pub async fn replace_for_wallet(
        &self,
        wallet: &str,
        holdings: &HashMap<String, HoldingBalance>,
    ) -> Result<(), DbError> {
        wallet_holdings::Entity::delete_many()
            .filter(wallet_holdings::Column::WalletAddress.eq(wallet))
            .exec(&self.conn)
            .await?;

        if holdings.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        let rows: Vec<wallet_holdings::ActiveModel> = holdings
            .iter()
            .map(|(token, balance)| wallet_holdings::ActiveModel {
                wallet_address: Set(wallet.to_string()),
                token_address: Set(token.clone()),
                raw_balance: Set(balance.raw.clone()),
                formatted_balance: Set(balance.formatted.clone()),
                last_updated: Set(now.into()),
            })
            .collect();

        wallet_holdings::Entity::insert_many(rows)
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
