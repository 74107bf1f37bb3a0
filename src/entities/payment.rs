use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cash movement against a document, attached through the polymorphic
/// `(payable_type, payable_id)` pair. Orders only ever carry `in` payments,
/// purchases only `out` (a domain convention, not a schema guarantee).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payable_type: String,
    pub payable_id: Uuid,
    pub direction: String,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
    pub method: String,
    pub note: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

// Polymorphic target; resolved per kind in the services, no FK relation.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
