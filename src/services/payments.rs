use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::enums::{due_amount, CashSourceKind, MovementDirection, PayableKind, PaymentStatus},
    entities::{cash_movement, order, payment, purchase},
    errors::ServiceError,
    events::{Event, EventSender},
    services::orders::{self, OrderResponse},
    services::purchases::{self, PurchaseResponse},
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    #[validate(range(min = 1, message = "Amount must be a positive integer"))]
    pub amount: i64,
    pub note: Option<String>,
    pub recorded_by: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub payable_type: PayableKind,
    pub payable_id: Uuid,
    pub direction: MovementDirection,
    pub amount: i64,
    pub paid_at: DateTime<Utc>,
    pub method: String,
    pub note: Option<String>,
    pub recorded_by: Uuid,
}

/// Payment plus the refreshed document header it was applied to.
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderPaymentOutcome {
    pub payment: PaymentResponse,
    pub order: OrderResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchasePaymentOutcome {
    pub payment: PaymentResponse,
    pub purchase: PurchaseResponse,
}

/// Inserts a payment and its 1:1 cash-ledger mirror on the given connection.
/// Direction is fixed by the document kind. Callers own the transaction.
pub(crate) async fn insert_payment_with_mirror<C: ConnectionTrait>(
    conn: &C,
    kind: PayableKind,
    payable_id: Uuid,
    amount: i64,
    note: Option<String>,
    recorded_by: Uuid,
    paid_at: DateTime<Utc>,
) -> Result<payment::Model, ServiceError> {
    let direction = kind.payment_direction();

    let payment_model = payment::ActiveModel {
        id: Set(Uuid::new_v4()),
        payable_type: Set(kind.to_string()),
        payable_id: Set(payable_id),
        direction: Set(direction.to_string()),
        amount: Set(amount),
        paid_at: Set(paid_at),
        method: Set("cash".to_string()),
        note: Set(note),
        recorded_by: Set(recorded_by),
        created_at: Set(paid_at),
    }
    .insert(conn)
    .await
    .map_err(ServiceError::DatabaseError)?;

    let ledger_note = match kind {
        PayableKind::Order => "Sale payment",
        PayableKind::Purchase => "Purchase payment",
    };
    cash_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        source_type: Set(CashSourceKind::Payment.to_string()),
        source_id: Set(payment_model.id),
        direction: Set(direction.to_string()),
        amount: Set(amount),
        occurred_at: Set(payment_model.paid_at),
        balance_after: Set(None),
        note: Set(Some(ledger_note.to_string())),
        recorded_by: Set(Some(recorded_by)),
        created_at: Set(paid_at),
    }
    .insert(conn)
    .await
    .map_err(ServiceError::DatabaseError)?;

    Ok(payment_model)
}

/// Sum of all payments ever recorded against a document. The derived header
/// fields are a cache of this value, never the other way around.
pub(crate) async fn paid_sum<C: ConnectionTrait>(
    conn: &C,
    kind: PayableKind,
    payable_id: Uuid,
) -> Result<i64, ServiceError> {
    let rows = payment::Entity::find()
        .filter(payment::Column::PayableType.eq(kind.to_string()))
        .filter(payment::Column::PayableId.eq(payable_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
    Ok(rows.iter().map(|p| p.amount).sum())
}

pub(crate) fn model_to_response(model: &payment::Model) -> Result<PaymentResponse, ServiceError> {
    let payable_type = model.payable_type.parse::<PayableKind>().map_err(|_| {
        ServiceError::InternalError(format!(
            "Payment {} carries unknown payable type '{}'",
            model.id, model.payable_type
        ))
    })?;
    let direction = model.direction.parse::<MovementDirection>().map_err(|_| {
        ServiceError::InternalError(format!(
            "Payment {} carries unknown direction '{}'",
            model.id, model.direction
        ))
    })?;
    Ok(PaymentResponse {
        id: model.id,
        payable_type,
        payable_id: model.payable_id,
        direction,
        amount: model.amount,
        paid_at: model.paid_at,
        method: model.method.clone(),
        note: model.note.clone(),
        recorded_by: model.recorded_by,
    })
}

/// Service for recording payments against documents and keeping the derived
/// paid/due/status fields consistent with the payment history.
#[derive(Clone)]
pub struct PaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl PaymentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records a cash receipt against a sale order (A/R collection).
    ///
    /// The order's paid/due/status fields are recomputed from the full
    /// payment history inside the same transaction, so an out-of-band
    /// payment row is healed on the next recording rather than drifting.
    #[instrument(skip(self, request), fields(order_id = %order_id, amount = request.amount))]
    pub async fn record_order_payment(
        &self,
        order_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<OrderPaymentOutcome, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to start payment transaction");
            ServiceError::DatabaseError(e)
        })?;

        let order_model = order::Entity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let payment_model = insert_payment_with_mirror(
            &txn,
            PayableKind::Order,
            order_id,
            request.amount,
            request.note.clone(),
            request.recorded_by,
            now,
        )
        .await?;

        let refreshed = refresh_order_payment_status(&txn, order_model, now).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit payment transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %order_id,
            payment_id = %payment_model.id,
            paid_amount = refreshed.paid_amount,
            status = %refreshed.status,
            "Order payment recorded"
        );
        self.emit_payment_event(&payment_model).await;

        Ok(OrderPaymentOutcome {
            payment: model_to_response(&payment_model)?,
            order: orders::model_to_response(refreshed)?,
        })
    }

    /// Records a cash payment against a purchase (A/P settlement).
    #[instrument(skip(self, request), fields(purchase_id = %purchase_id, amount = request.amount))]
    pub async fn record_purchase_payment(
        &self,
        purchase_id: Uuid,
        request: RecordPaymentRequest,
    ) -> Result<PurchasePaymentOutcome, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let now = Utc::now();

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, purchase_id = %purchase_id, "Failed to start payment transaction");
            ServiceError::DatabaseError(e)
        })?;

        let purchase_model = purchase::Entity::find_by_id(purchase_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase {} not found", purchase_id))
            })?;

        let payment_model = insert_payment_with_mirror(
            &txn,
            PayableKind::Purchase,
            purchase_id,
            request.amount,
            request.note.clone(),
            request.recorded_by,
            now,
        )
        .await?;

        let refreshed = refresh_purchase_payment_status(&txn, purchase_model, now).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, purchase_id = %purchase_id, "Failed to commit payment transaction");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            purchase_id = %purchase_id,
            payment_id = %payment_model.id,
            paid_amount = refreshed.paid_amount,
            status = %refreshed.status,
            "Purchase payment recorded"
        );
        self.emit_payment_event(&payment_model).await;

        Ok(PurchasePaymentOutcome {
            payment: model_to_response(&payment_model)?,
            purchase: purchases::model_to_response(refreshed)?,
        })
    }

    async fn emit_payment_event(&self, payment_model: &payment::Model) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::PaymentRecorded {
                    payment_id: payment_model.id,
                    payable_type: payment_model.payable_type.clone(),
                    payable_id: payment_model.payable_id,
                    amount: payment_model.amount,
                })
                .await
            {
                warn!(error = %e, payment_id = %payment_model.id, "Failed to send payment event");
            }
        }
    }
}

/// Recomputes an order's derived payment fields from its payment rows and
/// persists the header. Idempotent: running it twice yields the same state.
pub(crate) async fn refresh_order_payment_status<C: ConnectionTrait>(
    conn: &C,
    order_model: order::Model,
    now: DateTime<Utc>,
) -> Result<order::Model, ServiceError> {
    let paid = paid_sum(conn, PayableKind::Order, order_model.id).await?;
    let total = order_model.total;

    let mut active: order::ActiveModel = order_model.into();
    active.paid_amount = Set(paid);
    active.due_amount = Set(due_amount(total, paid));
    active.status = Set(PaymentStatus::derive(total, paid).to_string());
    active.updated_at = Set(Some(now));
    active.update(conn).await.map_err(ServiceError::DatabaseError)
}

/// Purchase-side counterpart of [`refresh_order_payment_status`].
pub(crate) async fn refresh_purchase_payment_status<C: ConnectionTrait>(
    conn: &C,
    purchase_model: purchase::Model,
    now: DateTime<Utc>,
) -> Result<purchase::Model, ServiceError> {
    let paid = paid_sum(conn, PayableKind::Purchase, purchase_model.id).await?;
    let total = purchase_model.total;

    let mut active: purchase::ActiveModel = purchase_model.into();
    active.paid_amount = Set(paid);
    active.due_amount = Set(due_amount(total, paid));
    active.status = Set(PaymentStatus::derive(total, paid).to_string());
    active.updated_at = Set(Some(now));
    active.update(conn).await.map_err(ServiceError::DatabaseError)
}
