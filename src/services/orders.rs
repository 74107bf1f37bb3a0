use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
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
    entities::{order, order_item, payment, product, stock_movement},
    errors::ServiceError,
    events::{Event, EventSender},
    services::payments::{self, PaymentResponse},
};

/// One requested line of a document. `currency_id` defaults to the product's
/// currency and must match it when supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: i64,
    pub currency_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    /// Document date; defaults to today.
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<LineItemInput>,
    /// Initial payment taken at creation time.
    #[serde(default)]
    pub paid_amount: i64,
    pub note: Option<String>,
    pub recorded_by: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
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
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub currency_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Full document view: header plus line items and payment history.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    pub payments: Vec<PaymentResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListFilter {
    pub customer_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

/// Rounds a quantity-times-price product to a whole-unit amount.
pub(crate) fn line_total(quantity: Decimal, unit_price: i64) -> Result<i64, ServiceError> {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::RoundingStrategy;

    (Decimal::from(unit_price) * quantity)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ServiceError::ValidationError("Line total out of range".to_string()))
}

pub(crate) fn validate_lines(items: &[LineItemInput], paid_amount: i64) -> Result<(), ServiceError> {
    if paid_amount < 0 {
        return Err(ServiceError::ValidationError(
            "paid_amount must not be negative".to_string(),
        ));
    }
    for item in items {
        if item.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for product {} must be positive",
                item.product_id
            )));
        }
        if item.unit_price < 0 {
            return Err(ServiceError::ValidationError(format!(
                "Unit price for product {} must not be negative",
                item.product_id
            )));
        }
    }
    Ok(())
}

/// Service for sales documents: creation with stock checks and ledger
/// postings, plus read access.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a sale order atomically: header, lines, stock decrements,
    /// stock-movement postings and the optional initial payment either all
    /// land or none do.
    ///
    /// Totals are computed server-side; client-supplied totals are never
    /// trusted. Each sale line takes an exclusive row lock on its product to
    /// serialize concurrent sales and prevent overselling.
    #[instrument(skip(self, request), fields(customer_id = ?request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderDetails, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        validate_lines(&request.items, request.paid_amount)?;

        let db = &*self.db_pool;
        let now = Utc::now();
        let date = request.date.unwrap_or_else(|| now.date_naive());
        let order_id = Uuid::new_v4();
        let paid = request.paid_amount;

        // Server-side total over all lines.
        let mut total: i64 = 0;
        for item in &request.items {
            total = total
                .checked_add(line_total(item.quantity, item.unit_price)?)
                .ok_or_else(|| {
                    ServiceError::ValidationError("Order total out of range".to_string())
                })?;
        }

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order creation");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = order::ActiveModel {
            id: Set(order_id),
            customer_id: Set(request.customer_id),
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
            error!(error = %e, order_id = %order_id, "Failed to insert order header");
            ServiceError::DatabaseError(e)
        })?;

        let mut item_responses = Vec::with_capacity(request.items.len());
        let mut depleted = Vec::new();

        for item in &request.items {
            // Exclusive row lock for the rest of the transaction; concurrent
            // sales of the same product queue up here.
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

            if product_row.quantity < item.quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id: product_row.id,
                    available: product_row.quantity,
                    requested: item.quantity,
                });
            }

            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                currency_id: Set(currency_id),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            let remaining = product_row.quantity - item.quantity;
            let mut product_update: product::ActiveModel = product_row.into();
            product_update.quantity = Set(remaining);
            product_update.updated_at = Set(Some(now));
            product_update
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;

            stock_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(item.product_id),
                direction: Set(MovementDirection::Out.to_string()),
                quantity: Set(item.quantity),
                source_type: Set(StockSourceKind::OrderItem.to_string()),
                source_id: Set(line.id),
                moved_at: Set(now),
                note: Set(Some("Sale".to_string())),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;

            if remaining <= Decimal::ZERO {
                depleted.push((item.product_id, remaining));
            }

            item_responses.push(OrderItemResponse {
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
                PayableKind::Order,
                order_id,
                paid,
                Some("Initial payment".to_string()),
                request.recorded_by,
                now,
            )
            .await?;
            payment_responses.push(payments::model_to_response(&initial)?);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, total = total, paid = paid, "Order created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order created event");
            }
            for (product_id, remaining) in depleted {
                if let Err(e) = event_sender
                    .send(Event::StockDepleted {
                        product_id,
                        remaining,
                    })
                    .await
                {
                    warn!(error = %e, product_id = %product_id, "Failed to send stock depleted event");
                }
            }
        }

        Ok(OrderDetails {
            order: model_to_response(order_model)?,
            items: item_responses,
            payments: payment_responses,
        })
    }

    /// Fetches a single order with its line items and payment history.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let db = &*self.db_pool;

        let order_model = order::Entity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .order_by_asc(order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let payment_rows = payment::Entity::find()
            .filter(payment::Column::PayableType.eq(PayableKind::Order.to_string()))
            .filter(payment::Column::PayableId.eq(order_id))
            .order_by_asc(payment::Column::PaidAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut item_responses = Vec::with_capacity(items.len());
        for line in items {
            item_responses.push(OrderItemResponse {
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

        Ok(OrderDetails {
            order: model_to_response(order_model)?,
            items: item_responses,
            payments,
        })
    }

    /// Lists orders newest-first with optional counterparty and date filters.
    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        page: u64,
        per_page: u64,
        filter: OrderListFilter,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = &*self.db_pool;

        let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(order::Column::CustomerId.eq(customer_id));
        }
        if let Some(from) = filter.from_date {
            query = query.filter(order::Column::Date.gte(from));
        }
        if let Some(to) = filter.to_date {
            query = query.filter(order::Column::Date.lte(to));
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

        let orders = rows
            .into_iter()
            .map(model_to_response)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }
}

pub(crate) fn model_to_response(model: order::Model) -> Result<OrderResponse, ServiceError> {
    let status = model.status.parse::<PaymentStatus>().map_err(|_| {
        ServiceError::InternalError(format!(
            "Order {} carries unknown status '{}'",
            model.id, model.status
        ))
    })?;
    Ok(OrderResponse {
        id: model.id,
        customer_id: model.customer_id,
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_total_multiplies_and_rounds() {
        assert_eq!(line_total(dec!(5), 1000).unwrap(), 5000);
        assert_eq!(line_total(dec!(2.5), 1000).unwrap(), 2500);
        assert_eq!(line_total(dec!(0.333), 1000).unwrap(), 333);
        assert_eq!(line_total(dec!(1.5), 1).unwrap(), 2);
    }

    #[test]
    fn validate_lines_rejects_bad_input() {
        let good = LineItemInput {
            product_id: Uuid::new_v4(),
            quantity: dec!(1),
            unit_price: 100,
            currency_id: None,
        };
        assert!(validate_lines(std::slice::from_ref(&good), 0).is_ok());

        let zero_qty = LineItemInput {
            quantity: Decimal::ZERO,
            ..good.clone()
        };
        assert!(matches!(
            validate_lines(&[zero_qty], 0),
            Err(ServiceError::ValidationError(_))
        ));

        let negative_price = LineItemInput {
            unit_price: -5,
            ..good.clone()
        };
        assert!(matches!(
            validate_lines(&[negative_price], 0),
            Err(ServiceError::ValidationError(_))
        ));

        assert!(matches!(
            validate_lines(std::slice::from_ref(&good), -1),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
