use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MovementDirection;

/// Append-only inventory delta, tagged with the line item that caused it
/// through the polymorphic `(source_type, source_id)` pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub direction: String,
    pub quantity: Decimal,
    pub source_type: String,
    pub source_id: Uuid,
    pub moved_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// Signed quantity: positive for `in`, negative for `out`. The running
    /// sum of these per product must equal the product's on-hand quantity.
    pub fn signed_quantity(&self) -> Decimal {
        match self.direction.parse::<MovementDirection>() {
            Ok(MovementDirection::In) => self.quantity,
            _ => -self.quantity,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
