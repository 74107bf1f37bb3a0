use sea_orm_migration::prelude::*;

use crate::m20250925_000002_create_products_table::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Payments::PayableType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PayableId).uuid().not_null())
                    .col(
                        ColumnDef::new(Payments::Direction)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PaidAt).timestamp_with_time_zone().not_null())
                    .col(
                        ColumnDef::new(Payments::Method)
                            .string_len(16)
                            .not_null()
                            .default("cash"),
                    )
                    .col(ColumnDef::new(Payments::Note).text().null())
                    .col(ColumnDef::new(Payments::RecordedBy).uuid().not_null())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_payable")
                    .table(Payments::Table)
                    .col(Payments::PayableType)
                    .col(Payments::PayableId)
                    .col(Payments::Direction)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_paid_at")
                    .table(Payments::Table)
                    .col(Payments::PaidAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashMovements::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashMovements::SourceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashMovements::SourceId).uuid().not_null())
                    .col(
                        ColumnDef::new(CashMovements::Direction)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashMovements::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashMovements::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashMovements::BalanceAfter)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(CashMovements::Note).text().null())
                    .col(ColumnDef::new(CashMovements::RecordedBy).uuid().null())
                    .col(
                        ColumnDef::new(CashMovements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cash_movements_source")
                    .table(CashMovements::Table)
                    .col(CashMovements::SourceType)
                    .col(CashMovements::SourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::ProductId).uuid().not_null())
                    .col(
                        ColumnDef::new(StockMovements::Direction)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::Quantity)
                            .decimal_len(18, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(StockMovements::SourceType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::SourceId).uuid().not_null())
                    .col(ColumnDef::new(StockMovements::MovedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(StockMovements::Note).text().null())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stock_movements_product_id")
                            .from(StockMovements::Table, StockMovements::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_product_moved_at")
                    .table(StockMovements::Table)
                    .col(StockMovements::ProductId)
                    .col(StockMovements::MovedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stock_movements_source")
                    .table(StockMovements::Table)
                    .col(StockMovements::SourceType)
                    .col(StockMovements::SourceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payments {
    Table,
    Id,
    PayableType,
    PayableId,
    Direction,
    Amount,
    PaidAt,
    Method,
    Note,
    RecordedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum CashMovements {
    Table,
    Id,
    SourceType,
    SourceId,
    Direction,
    Amount,
    OccurredAt,
    BalanceAfter,
    Note,
    RecordedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum StockMovements {
    Table,
    Id,
    ProductId,
    Direction,
    Quantity,
    SourceType,
    SourceId,
    MovedAt,
    Note,
    CreatedAt,
}
