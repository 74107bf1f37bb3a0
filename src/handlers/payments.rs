use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::payments::RecordPaymentRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct OutstandingQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

pub async fn record_order_payment(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    state
        .services
        .payments
        .record_order_payment(order_id, request)
        .await
        .map(|outcome| (StatusCode::CREATED, Json(outcome)))
}

pub async fn record_purchase_payment(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
    Json(request): Json<RecordPaymentRequest>,
) -> impl IntoResponse {
    state
        .services
        .payments
        .record_purchase_payment(purchase_id, request)
        .await
        .map(|outcome| (StatusCode::CREATED, Json(outcome)))
}

/// Orders with money still due (the receivable work queue).
pub async fn outstanding_orders(
    State(state): State<AppState>,
    Query(query): Query<OutstandingQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .outstanding_orders(query.page.unwrap_or(1), query.per_page.unwrap_or(20))
        .await
        .map(Json)
}

/// Purchases with money still due (the payable work queue).
pub async fn outstanding_purchases(
    State(state): State<AppState>,
    Query(query): Query<OutstandingQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .outstanding_purchases(query.page.unwrap_or(1), query.per_page.unwrap_or(20))
        .await
        .map(Json)
}
