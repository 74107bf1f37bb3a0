use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::services::reports::DateRange;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<RangeQuery> for DateRange {
    fn from(query: RangeQuery) -> Self {
        DateRange {
            from: query.from,
            to: query.to,
        }
    }
}

pub async fn accounts_receivable(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .customer_balances(query.into())
        .await
        .map(Json)
}

pub async fn owing_customers(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .owing_customers(query.into())
        .await
        .map(Json)
}

pub async fn accounts_payable(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .supplier_balances(query.into())
        .await
        .map(Json)
}

pub async fn owed_suppliers(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .owed_suppliers(query.into())
        .await
        .map(Json)
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> impl IntoResponse {
    state
        .services
        .reports
        .dashboard_metrics(query.into())
        .await
        .map(Json)
}
