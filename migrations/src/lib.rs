pub use sea_orm_migration::prelude::*;

mod m20250925_000001_create_reference_tables;
mod m20250925_000002_create_products_table;
mod m20250925_000003_create_orders_tables;
mod m20250925_000004_create_purchases_tables;
mod m20250925_000005_create_ledger_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250925_000001_create_reference_tables::Migration),
            Box::new(m20250925_000002_create_products_table::Migration),
            Box::new(m20250925_000003_create_orders_tables::Migration),
            Box::new(m20250925_000004_create_purchases_tables::Migration),
            Box::new(m20250925_000005_create_ledger_tables::Migration),
        ]
    }
}
