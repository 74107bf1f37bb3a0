use sea_orm_migration::prelude::*;

use crate::m20250925_000001_create_reference_tables::{Currencies, Suppliers};
use crate::m20250925_000002_create_products_table::Products;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Purchases::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Purchases::SupplierId).uuid().null())
                    .col(ColumnDef::new(Purchases::Date).date().not_null())
                    .col(
                        ColumnDef::new(Purchases::Total)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Purchases::PaidAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Purchases::DueAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Purchases::Status)
                            .string_len(16)
                            .not_null()
                            .default("unpaid"),
                    )
                    .col(ColumnDef::new(Purchases::Note).text().null())
                    .col(ColumnDef::new(Purchases::RecordedBy).uuid().not_null())
                    .col(ColumnDef::new(Purchases::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Purchases::UpdatedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_supplier_id")
                            .from(Purchases::Table, Purchases::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchases_date")
                    .table(Purchases::Table)
                    .col(Purchases::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseItems::Id)
                            .uuid()
                            .primary_key()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PurchaseItems::PurchaseId).uuid().not_null())
                    .col(ColumnDef::new(PurchaseItems::ProductId).uuid().not_null())
                    .col(ColumnDef::new(PurchaseItems::CurrencyId).uuid().not_null())
                    .col(
                        ColumnDef::new(PurchaseItems::Quantity)
                            .decimal_len(18, 3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseItems::UnitPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_items_purchase_id")
                            .from(PurchaseItems::Table, PurchaseItems::PurchaseId)
                            .to(Purchases::Table, Purchases::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_items_product_id")
                            .from(PurchaseItems::Table, PurchaseItems::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_items_currency_id")
                            .from(PurchaseItems::Table, PurchaseItems::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_items_purchase_product")
                    .table(PurchaseItems::Table)
                    .col(PurchaseItems::PurchaseId)
                    .col(PurchaseItems::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PurchaseItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Purchases {
    Table,
    Id,
    SupplierId,
    Date,
    Total,
    PaidAmount,
    DueAmount,
    Status,
    Note,
    RecordedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum PurchaseItems {
    Table,
    Id,
    PurchaseId,
    ProductId,
    CurrencyId,
    Quantity,
    UnitPrice,
    CreatedAt,
}
