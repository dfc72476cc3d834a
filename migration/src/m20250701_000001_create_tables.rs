use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_table("addresses").await? {
            // Main table of observed chain participants
            manager
                .create_table(
                    Table::create()
                        .table(Addresses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Addresses::Address)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Addresses::AddressType)
                                .string()
                                .not_null()
                                .default("unknown"),
                        )
                        .col(
                            ColumnDef::new(Addresses::LastActivityBlock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Addresses::LastActivityTimestamp)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Addresses::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("addresses_last_activity_block")
                        .table(Addresses::Table)
                        .col(Addresses::LastActivityBlock)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("addresses_address_type")
                        .table(Addresses::Table)
                        .col(Addresses::AddressType)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("tokens").await? {
            // ERC-20 contracts that answered (or transiently failed) the probes
            manager
                .create_table(
                    Table::create()
                        .table(Tokens::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Tokens::Address)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Tokens::Name).string().not_null())
                        .col(ColumnDef::new(Tokens::Symbol).string().not_null())
                        .col(
                            ColumnDef::new(Tokens::Decimals)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Tokens::TotalSupply)
                                .text()
                                .not_null()
                                .default("0"),
                        )
                        .col(
                            ColumnDef::new(Tokens::Creator)
                                .string()
                                .not_null()
                                .default("Unknown"),
                        )
                        .col(
                            ColumnDef::new(Tokens::Status)
                                .string()
                                .not_null()
                                .default("detected"),
                        )
                        .col(
                            ColumnDef::new(Tokens::DiscoveredAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(ColumnDef::new(Tokens::LastRetry).timestamp_with_time_zone())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("tokens_status")
                        .table(Tokens::Table)
                        .col(Tokens::Status)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("tokens_discovered_at")
                        .table(Tokens::Table)
                        .col(Tokens::DiscoveredAt)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("indexer_checkpoint").await? {
            // Single-row resume pointer (id = 1)
            manager
                .create_table(
                    Table::create()
                        .table(IndexerCheckpoint::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(IndexerCheckpoint::Id)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(IndexerCheckpoint::CurrentBlock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(IndexerCheckpoint::CurrentEndpointUrl).string())
                        .col(
                            ColumnDef::new(IndexerCheckpoint::StartedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("activity_stats").await? {
            // 5-minute activity buckets keyed by (date, time_slot)
            manager
                .create_table(
                    Table::create()
                        .table(ActivityStats::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ActivityStats::Date).string().not_null())
                        .col(ColumnDef::new(ActivityStats::TimeSlot).string().not_null())
                        .col(
                            ColumnDef::new(ActivityStats::ActiveWallets)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ActivityStats::TotalTransactions)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ActivityStats::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .primary_key(
                            Index::create()
                                .col(ActivityStats::Date)
                                .col(ActivityStats::TimeSlot),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("activity_stats_date")
                        .table(ActivityStats::Table)
                        .col(ActivityStats::Date)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("wallet_holdings").await? {
            // Balances found by the wallet scan, replaced wholesale per wallet
            manager
                .create_table(
                    Table::create()
                        .table(WalletHoldings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WalletHoldings::WalletAddress)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WalletHoldings::TokenAddress)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WalletHoldings::RawBalance)
                                .text()
                                .not_null()
                                .default("0"),
                        )
                        .col(
                            ColumnDef::new(WalletHoldings::FormattedBalance)
                                .string()
                                .not_null()
                                .default("0"),
                        )
                        .col(
                            ColumnDef::new(WalletHoldings::LastUpdated)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .primary_key(
                            Index::create()
                                .col(WalletHoldings::WalletAddress)
                                .col(WalletHoldings::TokenAddress),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("wallet_holdings_wallet")
                        .table(WalletHoldings::Table)
                        .col(WalletHoldings::WalletAddress)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_table("scan_progress").await? {
            // Single-row progress record for the wallet scan (id = 1)
            manager
                .create_table(
                    Table::create()
                        .table(ScanProgress::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ScanProgress::Id)
                                .integer()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ScanProgress::Status)
                                .string()
                                .not_null()
                                .default("idle"),
                        )
                        .col(ColumnDef::new(ScanProgress::CurrentWallet).string())
                        .col(
                            ColumnDef::new(ScanProgress::Scanned)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ScanProgress::Total)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ScanProgress::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScanProgress::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletHoldings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ActivityStats::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(IndexerCheckpoint::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Tokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Addresses::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Addresses {
    Table,
    Address,
    AddressType,
    LastActivityBlock,
    LastActivityTimestamp,
    UpdatedAt,
}

#[derive(Iden)]
enum Tokens {
    Table,
    Address,
    Name,
    Symbol,
    Decimals,
    TotalSupply,
    Creator,
    Status,
    DiscoveredAt,
    LastRetry,
}

#[derive(Iden)]
enum IndexerCheckpoint {
    Table,
    Id,
    CurrentBlock,
    CurrentEndpointUrl,
    StartedAt,
}

#[derive(Iden)]
enum ActivityStats {
    Table,
    Date,
    TimeSlot,
    ActiveWallets,
    TotalTransactions,
    UpdatedAt,
}

#[derive(Iden)]
enum WalletHoldings {
    Table,
    WalletAddress,
    TokenAddress,
    RawBalance,
    FormattedBalance,
    LastUpdated,
}

#[derive(Iden)]
enum ScanProgress {
    Table,
    Id,
    Status,
    CurrentWallet,
    Scanned,
    Total,
    UpdatedAt,
}
