use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::orders::{CreateOrderRequest, OrderListFilter};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub customer_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    state
        .services
        .orders
        .create_order(request)
        .await
        .map(|details| (StatusCode::CREATED, Json(details)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    state.services.orders.get_order(order_id).await.map(Json)
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> impl IntoResponse {
    let filter = OrderListFilter {
        customer_id: query.customer_id,
        from_date: query.from_date,
        to_date: query.to_date,
    };
    state
        .services
        .orders
        .list_orders(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(20),
            filter,
        )
        .await
        .map(Json)
}
