//! Wallet holding entity for SeaORM

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_holdings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_address: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub token_address: String,
    #[sea_orm(column_type = "Text")]
    pub raw_balance: String,
    pub formatted_balance: String,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
