use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::enums::{due_amount, MovementDirection, PayableKind, PaymentStatus, StockSourceKind},
    entities::{payment, product, purchase, purchase_item, stock_movement},
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{line_total, validate_lines, LineItemInput},
    services::payments::{self, PaymentResponse},
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseRequest {
    pub supplier_id: Option<Uuid>,
    /// Document date; defaults to today.
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<LineItemInput>,
    /// Initial payment made at creation time.
    #[serde(default)]
    pub paid_amount: i64,
    pub note: Option<String>,
    pub recorded_by: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,
    pub date: NaiveDate,
    pub total: i64,
    pub paid_amount: i64,
    pub due_amount: i64,
    pub status: PaymentStatus,
    pub note: Option<String>,
    pub recorded_by: Uuid,
    pub created_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub currency_id: Uuid,
    pub quantity: rust_decimal::Decimal,
    pub unit_price: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseDetails {
    #[serde(flatten)]
    pub purchase: PurchaseResponse,
    pub items: Vec<PurchaseItemResponse>,
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseListResponse {
    pub purchases: Vec<PurchaseResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseListFilter {
    pub supplier_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Service for purchase documents: goods received from suppliers increase
/// stock, payments flow outward.
#[derive(Clone)]
pub struct PurchaseService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PurchaseService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a purchase atomically. No stock availability check applies on
    /// this path; each line increments the product's on-hand quantity and
    /// posts an `in` stock movement referencing the line.
    #[instrument(skip(self, request), fields(supplier_id = ?request.supplier_id))]
    pub async fn create_purchase(
        &self,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseDetails, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_lines(&request.items, request.paid_amount)?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());
        let purchase_id = Uuid::new_v4();
        let paid = request.paid_amount;

        let mut total: i64 = 0;
        for item in &request.items {
            total = total
                .checked_add(line_total(item.quantity, item.unit_price)?)
                .ok_or_else(|| {
                    ServiceError::ValidationError("Purchase total out of range".to_string())
                })?;
        }

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for purchase creation");
            ServiceError::DatabaseError(e)
        })?;

        let purchase_model = purchase::ActiveModel {
            id: Set(purchase_id),
            supplier_id: Set(request.supplier_id),
            date: Set(date),
            total: Set(total),
            paid_amount: Set(paid),
            due_amount: Set(due_amount(total, paid)),
            status: Set(PaymentStatus::derive(total, paid).to_string()),
            note: Set(request.note.clone()),
            recorded_by: Set(request.recorded_by),
            created_at: Set(now),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, purchase_id = %purchase_id, "Failed to insert purchase header");
            ServiceError::DatabaseError(e)
        })?;

        let mut item_responses = Vec::with_capacity(request.items.len());

        for item in &request.items {
            // Locked for the quantity read-modify-write; purchases racing
            // sales on the same product serialize here too.
            let product_row = product::Entity::find_by_id(item.product_id)
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", item.product_id))
                })?;

            let currency_id = item.currency_id.unwrap_or(product_row.currency_id);
            if currency_id != product_row.currency_id {
                return Err(ServiceError::CurrencyMismatch {
                    product_id: product_row.id,
                    expected: product_row.currency_id,
                    got: currency_id,
                });
            }

            let line = purchase_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                purchase_id: Set(purchase_id),
                product_id: Set(item.product_id),
                currency_id: Set(currency_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            let new_quantity = product_row.quantity + item.quantity;
            let mut product_update: product::ActiveModel = product_row.into();
            product_update.quantity = Set(new_quantity);
            product_update.updated_at = Set(Some(now));
            product_update
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            stock_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(item.product_id),
                direction: Set(MovementDirection::In.to_string()),
                quantity: Set(item.quantity),
                source_type: Set(StockSourceKind::PurchaseItem.to_string()),
                source_id: Set(line.id),
                moved_at: Set(now),
                note: Set(Some("Purchase".to_string())),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            item_responses.push(PurchaseItemResponse {
                id: line.id,
                product_id: line.product_id,
                currency_id: line.currency_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line_total(line.quantity, line.unit_price)?,
            });
        }

        let mut payment_responses = Vec::new();
        if paid > 0 {
            let initial = payments::insert_payment_with_mirror(
                &txn,
                PayableKind::Purchase,
                purchase_id,
                paid,
                Some("Initial payment".to_string()),
                request.recorded_by,
                now,
            )
            .await?;
            payment_responses.push(payments::model_to_response(&initial)?);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, purchase_id = %purchase_id, "Failed to commit purchase creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(purchase_id = %purchase_id, total = total, paid = paid, "Purchase created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::PurchaseCreated(purchase_id)).await {
                warn!(error = %e, purchase_id = %purchase_id, "Failed to send purchase created event");
            }
        }

        Ok(PurchaseDetails {
            purchase: model_to_response(purchase_model)?,
            items: item_responses,
            payments: payment_responses,
        })
    }

    /// Fetches a single purchase with its line items and payment history.
    #[instrument(skip(self), fields(purchase_id = %purchase_id))]
    pub async fn get_purchase(&self, purchase_id: Uuid) -> Result<PurchaseDetails, ServiceError> {
        let db = &*self.db_pool;

        let purchase_model = purchase::Entity::find_by_id(purchase_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase {} not found", purchase_id))
            })?;

        let items = purchase_item::Entity::find()
            .filter(purchase_item::Column::PurchaseId.eq(purchase_id))
            .order_by_asc(purchase_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let payment_rows = payment::Entity::find()
            .filter(payment::Column::PayableType.eq(PayableKind::Purchase.to_string()))
            .filter(payment::Column::PayableId.eq(purchase_id))
            .order_by_asc(payment::Column::PaidAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut item_responses = Vec::with_capacity(items.len());
        for line in items {
            item_responses.push(PurchaseItemResponse {
                id: line.id,
                product_id: line.product_id,
                currency_id: line.currency_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line_total(line.quantity, line.unit_price)?,
            });
        }

        let payments = payment_rows
            .iter()
            .map(payments::model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PurchaseDetails {
            purchase: model_to_response(purchase_model)?,
            items: item_responses,
            payments,
        })
    }

    /// Lists purchases newest-first with optional supplier and date filters.
    #[instrument(skip(self, filter))]
    pub async fn list_purchases(
        &self,
        page: u64,
        per_page: u64,
        filter: PurchaseListFilter,
    ) -> Result<PurchaseListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = purchase::Entity::find().order_by_desc(purchase::Column::CreatedAt);
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(purchase::Column::SupplierId.eq(supplier_id));
        }
        if let Some(from) = filter.from_date {
            query = query.filter(purchase::Column::Date.gte(from));
        }
        if let Some(to) = filter.to_date {
            query = query.filter(purchase::Column::Date.lte(to));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;

        let purchases = rows
            .into_iter()
            .map(model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PurchaseListResponse {
            purchases,
            total,
            page,
            per_page,
        })
    }
}

pub(crate) fn model_to_response(model: purchase::Model) -> Result<PurchaseResponse, ServiceError> {
    let status = model.status.parse::<PaymentStatus>().map_err(|_| {
        ServiceError::InternalError(format!(
            "Purchase {} carries unknown status '{}'",
            model.id, model.status
        ))
    })?;
    Ok(PurchaseResponse {
        id: model.id,
        supplier_id: model.supplier_id,
        date: model.date,
        total: model.total,
        paid_amount: model.paid_amount,
        due_amount: model.due_amount,
        status,
        note: model.note,
        recorded_by: model.recorded_by,
        created_at: model.created_at,
    })
}
