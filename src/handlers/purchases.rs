use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::purchases::{CreatePurchaseRequest, PurchaseListFilter};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPurchasesQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub supplier_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

pub async fn create_purchase(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseRequest>,
) -> impl IntoResponse {
    state
        .services
        .purchases
        .create_purchase(request)
        .await
        .map(|details| (StatusCode::CREATED, Json(details)))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> impl IntoResponse {
    state
        .services
        .purchases
        .get_purchase(purchase_id)
        .await
        .map(Json)
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Query(query): Query<ListPurchasesQuery>,
) -> impl IntoResponse {
    let filter = PurchaseListFilter {
        supplier_id: query.supplier_id,
        from_date: query.from_date,
        to_date: query.to_date,
    };
    state
        .services
        .purchases
        .list_purchases(
            query.page.unwrap_or(1),
            query.per_page.unwrap_or(20),
            filter,
        )
        .await
        .map(Json)
}
