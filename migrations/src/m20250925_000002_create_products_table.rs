use sea_orm_migration::prelude::*;

use crate::m20250925_000001_create_reference_tables::{Currencies, Units};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                    .col(
                        ColumnDef::new(Products::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Products::Code).string().null())
                    .col(ColumnDef::new(Products::UnitId).uuid().not_null())
                    .col(ColumnDef::new(Products::CurrencyId).uuid().not_null())
                    .col(
                        ColumnDef::new(Products::Quantity)
                            .decimal_len(18, 3)
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Products::DefaultBuyPrice).big_integer().null())
                    .col(
                        ColumnDef::new(Products::DefaultSellPrice)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Products::Description).text().null())
                    .col(ColumnDef::new(Products::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Products::UpdatedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_unit_id")
                            .from(Products::Table, Products::UnitId)
                            .to(Units::Table, Units::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_products_currency_id")
                            .from(Products::Table, Products::CurrencyId)
                            .to(Currencies::Table, Currencies::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_products_code")
                    .table(Products::Table)
                    .col(Products::Code)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Name,
    Code,
    UnitId,
    CurrencyId,
    Quantity,
    DefaultBuyPrice,
    DefaultSellPrice,
    Description,
    CreatedAt,
    UpdatedAt,
}
