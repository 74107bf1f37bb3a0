#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use migrations::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use uuid::Uuid;

use tradebook_api::{
    db::DbPool,
    entities::{currency, customer, product, supplier, unit},
    AppServices,
};

pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
}

/// Fresh in-memory SQLite database with all migrations applied.
///
/// The pool is pinned to a single connection so every query sees the same
/// in-memory database.
pub async fn spawn_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    let db = Arc::new(db);
    let services = AppServices::new(db.clone(), None);
    TestApp { db, services }
}

impl TestApp {
    pub async fn seed_unit(&self, name: &str) -> unit::Model {
        unit::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed unit")
    }

    pub async fn seed_currency(&self, code: &str) -> currency::Model {
        currency::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            name: Set(code.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed currency")
    }

    pub async fn seed_customer(&self, name: &str) -> customer::Model {
        customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            phone: Set(None),
            address: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed customer")
    }

    pub async fn seed_supplier(&self, name: &str) -> supplier::Model {
        supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            phone: Set(None),
            address: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed supplier")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        unit_id: Uuid,
        currency_id: Uuid,
        quantity: Decimal,
        default_buy_price: Option<i64>,
        default_sell_price: Option<i64>,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            code: Set(None),
            unit_id: Set(unit_id),
            currency_id: Set(currency_id),
            quantity: Set(quantity),
            default_buy_price: Set(default_buy_price),
            default_sell_price: Set(default_sell_price),
            description: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(&*self.db)
        .await
        .expect("failed to seed product")
    }

    /// Unit, currency and one product in a single call; the common fixture.
    pub async fn seed_basic_product(&self, name: &str, quantity: Decimal) -> product::Model {
        let unit = self.seed_unit("pcs").await;
        let currency = self.seed_currency("USD").await;
        self.seed_product(name, unit.id, currency.id, quantity, Some(800), Some(1000))
            .await
    }
}
